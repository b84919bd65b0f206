//! Free-reference detection for the theme context identifier

use swc_core::ecma::ast::{ArrowExpr, Expr, Function, ObjectPatProp, Pat, Prop};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::constants::THEME_PARAM;

/// Whether `node` contains a free reference to `theme`.
///
/// References inside closures that bind their own `theme` parameter are not
/// free and do not count.
pub fn has_context_reference<N>(node: &N) -> bool
where
    N: VisitWith<ThemeReferenceDetector>,
{
    let mut detector = ThemeReferenceDetector::default();
    node.visit_with(&mut detector);
    detector.found
}

#[derive(Debug, Default)]
pub struct ThemeReferenceDetector {
    found: bool,
}

impl Visit for ThemeReferenceDetector {
    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if let Expr::Ident(ident) = expr {
            if &*ident.sym == THEME_PARAM {
                self.found = true;
                return;
            }
        }
        expr.visit_children_with(self);
    }

    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            if &*ident.sym == THEME_PARAM {
                self.found = true;
                return;
            }
        }
        prop.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        if arrow.params.iter().any(|p| binds_name(p, THEME_PARAM)) {
            return;
        }
        arrow.visit_children_with(self);
    }

    fn visit_function(&mut self, function: &Function) {
        if function.params.iter().any(|p| binds_name(&p.pat, THEME_PARAM)) {
            return;
        }
        function.visit_children_with(self);
    }
}

/// Whether a parameter pattern introduces a binding called `name`.
pub fn binds_name(pat: &Pat, name: &str) -> bool {
    match pat {
        Pat::Ident(binding) => &*binding.id.sym == name,
        Pat::Assign(assign) => binds_name(&assign.left, name),
        Pat::Rest(rest) => binds_name(&rest.arg, name),
        Pat::Array(array) => array.elems.iter().flatten().any(|p| binds_name(p, name)),
        Pat::Object(object) => object.props.iter().any(|prop| match prop {
            ObjectPatProp::KeyValue(kv) => binds_name(&kv.value, name),
            ObjectPatProp::Assign(assign) => &*assign.key.sym == name,
            ObjectPatProp::Rest(rest) => binds_name(&rest.arg, name),
        }),
        _ => false,
    }
}
