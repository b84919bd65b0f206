//! Final shapes for rewritten style sites
//!
//! Singular sites become closures: `(theme: Theme) => ({...})` when the body
//! reads the theme, `() => ({...})` otherwise. Mergeable sites become a call
//! to the shared helper, which receives the rewritten fragments as they are.

use swc_core::common::util::take::Take;
use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    ArrowExpr, BindingIdent, BlockStmtOrExpr, CallExpr, Callee, Expr, ExprOrSpread, Ident,
    ParenExpr, Pat, TsEntityName, TsType, TsTypeAnn, TsTypeRef,
};

use crate::classifier::strip_parens;
use crate::constants::{HELPER_FN, THEME_PARAM, THEME_TYPE};
use crate::theme_ref::has_context_reference;

/// How a singular site ended up wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapped {
    WithTheme,
    WithoutTheme,
}

pub struct SiteWrapper {
    annotate: bool,
}

impl SiteWrapper {
    /// `annotate` adds the `: Theme` type to the injected parameter; it must
    /// be off for plain JavaScript sources.
    pub fn new(annotate: bool) -> Self {
        Self { annotate }
    }

    /// Wrap a singular, already rewritten site in place.
    pub fn wrap_singular(&self, site: &mut Expr) -> Wrapped {
        let body = site.take();
        let uses_theme = has_context_reference(&body);
        *site = self.closure(body, uses_theme);

        if uses_theme {
            Wrapped::WithTheme
        } else {
            Wrapped::WithoutTheme
        }
    }

    /// Replace a mergeable site with `applyTheme(...fragments)`. Array-literal
    /// fragments are flattened into the argument list; object fragments are
    /// passed through as plain objects.
    pub fn merge(&self, site: &mut Expr, fragments: Vec<ExprOrSpread>) {
        let args = flatten_fragments(fragments);

        *site = Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(Box::new(ident_expr(HELPER_FN))),
            args,
            type_args: None,
        });
    }

    fn closure(&self, body: Expr, with_theme: bool) -> Expr {
        let body = match body {
            Expr::Object(_) => Expr::Paren(ParenExpr {
                span: DUMMY_SP,
                expr: Box::new(body),
            }),
            other => other,
        };

        let params = if with_theme {
            vec![self.theme_param()]
        } else {
            Vec::new()
        };

        Expr::Arrow(ArrowExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            params,
            body: Box::new(BlockStmtOrExpr::Expr(Box::new(body))),
            is_async: false,
            is_generator: false,
            type_params: None,
            return_type: None,
        })
    }

    fn theme_param(&self) -> Pat {
        let type_ann = self.annotate.then(|| {
            Box::new(TsTypeAnn {
                span: DUMMY_SP,
                type_ann: Box::new(TsType::TsTypeRef(TsTypeRef {
                    span: DUMMY_SP,
                    type_name: TsEntityName::Ident(Ident::new(
                        THEME_TYPE.into(),
                        DUMMY_SP,
                        SyntaxContext::empty(),
                    )),
                    type_params: None,
                })),
            })
        });

        Pat::Ident(BindingIdent {
            id: Ident::new(THEME_PARAM.into(), DUMMY_SP, SyntaxContext::empty()),
            type_ann,
        })
    }
}

/// Splice array-literal fragments into the surrounding list.
pub fn flatten_fragments(fragments: Vec<ExprOrSpread>) -> Vec<ExprOrSpread> {
    let mut flat = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let is_array = matches!(strip_parens(&fragment.expr), Expr::Array(_));
        if fragment.spread.is_some() || !is_array {
            flat.push(fragment);
            continue;
        }
        if let Expr::Array(array) = unparenthesize(*fragment.expr) {
            flat.extend(array.elems.into_iter().flatten());
        }
    }
    flat
}

fn unparenthesize(expr: Expr) -> Expr {
    match expr {
        Expr::Paren(paren) => unparenthesize(*paren.expr),
        other => other,
    }
}

fn ident_expr(name: &str) -> Expr {
    Expr::Ident(Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn fragments(source: &str) -> Vec<ExprOrSpread> {
        match parse_expression(source).unwrap() {
            Expr::Call(call) => call.args,
            other => panic!("expected call, found {other:?}"),
        }
    }

    #[test]
    fn test_wrap_singular_with_theme() {
        let wrapper = SiteWrapper::new(true);
        let mut site = parse_expression("{ color: theme.color.primary }").unwrap();
        assert_eq!(wrapper.wrap_singular(&mut site), Wrapped::WithTheme);

        let Expr::Arrow(arrow) = &site else { panic!("expected arrow") };
        assert_eq!(arrow.params.len(), 1);
        let Pat::Ident(param) = &arrow.params[0] else { panic!("expected ident param") };
        assert_eq!(&*param.id.sym, THEME_PARAM);
        assert!(param.type_ann.is_some());
        assert!(matches!(&*arrow.body, BlockStmtOrExpr::Expr(body) if matches!(**body, Expr::Paren(_))));
    }

    #[test]
    fn test_wrap_singular_without_theme() {
        let wrapper = SiteWrapper::new(true);
        let mut site = parse_expression("{ color: '#ccc' }").unwrap();
        assert_eq!(wrapper.wrap_singular(&mut site), Wrapped::WithoutTheme);

        let Expr::Arrow(arrow) = &site else { panic!("expected arrow") };
        assert!(arrow.params.is_empty());
    }

    #[test]
    fn test_wrap_call_body_is_not_parenthesized() {
        let wrapper = SiteWrapper::new(false);
        let mut site = parse_expression("css({ color: theme.color })").unwrap();
        wrapper.wrap_singular(&mut site);

        let Expr::Arrow(arrow) = &site else { panic!("expected arrow") };
        let Pat::Ident(param) = &arrow.params[0] else { panic!("expected ident param") };
        assert!(param.type_ann.is_none());
        assert!(matches!(&*arrow.body, BlockStmtOrExpr::Expr(body) if matches!(**body, Expr::Call(_))));
    }

    #[test]
    fn test_merge_flattens_and_keeps_objects_plain() {
        let wrapper = SiteWrapper::new(true);
        let mut site = Expr::dummy();
        wrapper.merge(
            &mut site,
            fragments("f(a, [{ color: theme.color.primary }, { margin: 0 }], ...rest)"),
        );

        let Expr::Call(call) = &site else { panic!("expected call") };
        assert!(matches!(&call.callee, Callee::Expr(callee) if matches!(&**callee, Expr::Ident(i) if &*i.sym == HELPER_FN)));
        assert_eq!(call.args.len(), 4);
        assert!(matches!(*call.args[0].expr, Expr::Ident(_)));
        assert!(matches!(*call.args[1].expr, Expr::Object(_)));
        assert!(matches!(*call.args[2].expr, Expr::Object(_)));
        assert!(call.args[3].spread.is_some());
    }
}
