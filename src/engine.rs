//! Rewrite engine
//!
//! One linear pass per module: visit and rewrite every style site post-order,
//! then inject the helper import if a merge needed it, then prune imports the
//! rewrite left unreferenced.

use swc_core::common::util::take::Take;
use swc_core::ecma::ast::{
    ArrowExpr, Expr, ExprOrSpread, JSXAttr, JSXAttrValue, JSXExpr, Module, VarDeclarator,
};
use swc_core::ecma::visit::{noop_visit_mut_type, VisitMut, VisitMutWith};

use crate::classifier::{
    calls_style_builder, classify_attribute_value, classify_call, is_style_attribute,
    strip_parens_mut, wrapped_style_call, SiteOrigin, SiteShape, StyleSite,
};
use crate::error::{Result, ThemifyError};
use crate::imports::{inject_helper_import, prune_unused_imports};
use crate::mapping::MappingTable;
use crate::property_rewriter::PropertyRewriter;
use crate::wrapper::{SiteWrapper, Wrapped};
use crate::{RewriteOptions, RewriteStats};

/// Per-pass state. Reset at the start of every pass.
#[derive(Debug, Default)]
pub struct RewriteState {
    pub helper_required: bool,
    pub stats: RewriteStats,
    error: Option<ThemifyError>,
}

pub struct Engine<'a> {
    mapping: &'a MappingTable,
    options: &'a RewriteOptions,
    wrapper: SiteWrapper,
    state: RewriteState,
}

impl<'a> Engine<'a> {
    pub fn new(mapping: &'a MappingTable, options: &'a RewriteOptions) -> Self {
        Self {
            mapping,
            options,
            wrapper: SiteWrapper::new(options.annotate_theme_param),
            state: RewriteState::default(),
        }
    }

    pub fn state(&self) -> &RewriteState {
        &self.state
    }

    /// Run a full pass over `module`. A configuration error aborts the pass
    /// and leaves the module in an unspecified state.
    pub fn rewrite(&mut self, module: &mut Module) -> Result<RewriteStats> {
        self.state = RewriteState::default();

        log::debug!("Rewriting style sites");
        module.visit_mut_with(self);

        if let Some(error) = self.state.error.take() {
            return Err(error);
        }

        if self.state.helper_required {
            self.state.stats.helper_injected =
                inject_helper_import(module, &self.options.helper_module);
        }

        if self.options.prune_imports {
            log::debug!("Pruning unused imports");
            self.state.stats.imports_pruned =
                prune_unused_imports(module, &self.options.retained_imports);
        }

        log::debug!(
            "Pass complete: {} sites, {} wrapped, {} merged, {} properties rewritten",
            self.state.stats.sites_found,
            self.state.stats.sites_wrapped,
            self.state.stats.sites_merged,
            self.state.stats.properties_rewritten
        );

        Ok(self.state.stats.clone())
    }

    fn failed(&self) -> bool {
        self.state.error.is_some()
    }

    /// Rewrite the property values of a site in place. Records the first
    /// configuration error and returns `false` if one was hit.
    fn rewrite_properties(&mut self, expr: &mut Expr) -> bool {
        let mut rewriter = PropertyRewriter::new(self.mapping);
        let result = rewriter.rewrite_fragment(expr);
        self.state.stats.properties_rewritten += rewriter.rewritten();

        match result {
            Ok(()) => true,
            Err(error) => {
                self.state.error.get_or_insert(error);
                false
            }
        }
    }

    fn apply_site(&mut self, site: StyleSite, slot: &mut Expr) {
        self.state.stats.sites_found += 1;

        if site.shape == SiteShape::AlreadyParameterized {
            log::trace!("{:?} site already parameterized", site.origin);
            self.state.stats.sites_skipped += 1;
            // Only a `(theme) => ...` closure has anything left to rewrite.
            self.rewrite_properties(slot);
            return;
        }

        if !self.rewrite_properties(slot) {
            return;
        }

        if site.mergeable {
            let fragments = take_fragments(slot, site.shape);
            log::trace!(
                "{:?} site merged through the helper ({} fragments)",
                site.origin,
                fragments.len()
            );
            self.wrapper.merge(slot, fragments);
            self.state.helper_required = true;
            self.state.stats.sites_merged += 1;
            return;
        }

        if site.shape == SiteShape::ArrayOfFragments {
            unwrap_single_fragment(slot);
        }
        let wrapped = self.wrapper.wrap_singular(slot);
        log::trace!("{:?} site wrapped ({:?})", site.origin, wrapped);
        if wrapped == Wrapped::WithTheme {
            self.state.stats.sites_parameterized += 1;
        }
        self.state.stats.sites_wrapped += 1;
    }
}

impl VisitMut for Engine<'_> {
    noop_visit_mut_type!();

    fn visit_mut_jsx_attr(&mut self, attr: &mut JSXAttr) {
        attr.visit_mut_children_with(self);

        if self.failed() || !is_style_attribute(&attr.name) {
            return;
        }

        let Some(JSXAttrValue::JSXExprContainer(container)) = &mut attr.value else {
            log::trace!("Skipping style attribute without an expression value");
            return;
        };
        let JSXExpr::Expr(expr) = &mut container.expr else {
            return;
        };

        match classify_attribute_value(expr) {
            Some(site) => self.apply_site(site, expr),
            None => log::trace!("Skipping style attribute with a literal value"),
        }
    }

    fn visit_mut_var_declarator(&mut self, declarator: &mut VarDeclarator) {
        if self.failed() {
            return;
        }
        declarator.name.visit_mut_with(self);

        let Some(init) = declarator.init.as_deref_mut() else {
            return;
        };

        if let Expr::Call(call) = &mut *init {
            if calls_style_builder(call) {
                call.args.visit_mut_with(self);
                if let Some(site) = classify_call(call, SiteOrigin::Binding) {
                    self.apply_site(site, init);
                }
                return;
            }
        }

        init.visit_mut_with(self);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.failed() {
            return;
        }

        if let Expr::Call(call) = &mut *expr {
            if calls_style_builder(call) {
                call.args.visit_mut_with(self);
                if let Some(site) = classify_call(call, SiteOrigin::Nested) {
                    self.apply_site(site, expr);
                }
                return;
            }
        }

        expr.visit_mut_children_with(self);
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        if self.failed() {
            return;
        }

        let binds_theme = !arrow.params.is_empty();
        match wrapped_style_call(arrow) {
            Some(body) => {
                // Already wrapped: only the arguments can hold new sites.
                if let Expr::Call(call) = &mut *body {
                    call.args.visit_mut_with(self);
                }
                if binds_theme {
                    self.rewrite_properties(body);
                }
            }
            None => arrow.visit_mut_children_with(self),
        }
    }
}

/// Move the fragments of a mergeable site out of its slot.
fn take_fragments(slot: &mut Expr, shape: SiteShape) -> Vec<ExprOrSpread> {
    match strip_parens_mut(slot) {
        Expr::Array(array) if shape == SiteShape::ArrayOfFragments => {
            std::mem::take(&mut array.elems).into_iter().flatten().collect()
        }
        Expr::Call(call) if calls_style_builder(call) => std::mem::take(&mut call.args),
        other => vec![ExprOrSpread {
            spread: None,
            expr: Box::new(other.take()),
        }],
    }
}

/// Replace `[fragment]` with `fragment`.
fn unwrap_single_fragment(slot: &mut Expr) {
    let fragment = match strip_parens_mut(slot) {
        Expr::Array(array) => array.elems.iter_mut().flatten().next().map(|e| e.expr.take()),
        _ => None,
    };
    if let Some(fragment) = fragment {
        *slot = *fragment;
    }
}

/// Rewrite `module` in place with a fresh engine.
pub fn rewrite_module(
    module: &mut Module,
    mapping: &MappingTable,
    options: &RewriteOptions,
) -> Result<RewriteStats> {
    Engine::new(mapping, options).rewrite(module)
}
