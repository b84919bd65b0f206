//! Style site classification
//!
//! A style site is one of:
//!
//! * the value of a `css` JSX attribute,
//! * the initializer of a variable bound from a `css(...)` call,
//! * a `css(...)` call nested anywhere else as a sub-expression.
//!
//! Classification decides whether the site holds exactly one static object
//! fragment (singular, wrapped in a closure) or has to go through the shared
//! helper (mergeable).

use swc_core::ecma::ast::{
    ArrowExpr, BlockStmtOrExpr, CallExpr, Callee, Expr, ExprOrSpread, JSXAttrName, Pat,
};

use crate::constants::{HELPER_FN, STYLE_ATTRIBUTE, STYLE_BUILDER, THEME_PARAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteShape {
    /// Object literal written directly as the attribute value.
    InlineObject,
    /// `css(...)` call bound to a variable.
    ExtractedCallBinding,
    /// Array of fragments as the attribute value. Any other dynamic attribute
    /// value is treated as a one-element array.
    ArrayOfFragments,
    /// `css(...)` call nested inside another expression.
    CallMerge,
    /// Closure or helper call; never wrapped again.
    AlreadyParameterized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOrigin {
    Attribute,
    Binding,
    Nested,
}

/// Classification of one site. The expression itself stays with the caller,
/// which owns the slot it is about to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSite {
    pub shape: SiteShape,
    pub mergeable: bool,
    pub origin: SiteOrigin,
}

impl StyleSite {
    fn new(shape: SiteShape, mergeable: bool, origin: SiteOrigin) -> Self {
        Self {
            shape,
            mergeable,
            origin,
        }
    }
}

pub fn is_style_attribute(name: &JSXAttrName) -> bool {
    matches!(name, JSXAttrName::Ident(ident) if &*ident.sym == STYLE_ATTRIBUTE)
}

pub fn is_style_builder_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(call) if callee_is(call, STYLE_BUILDER))
}

/// Whether the call's callee is the style builder itself.
pub fn calls_style_builder(call: &CallExpr) -> bool {
    callee_is(call, STYLE_BUILDER)
}

pub fn is_helper_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(call) if callee_is(call, HELPER_FN))
}

fn callee_is(call: &CallExpr, name: &str) -> bool {
    match &call.callee {
        Callee::Expr(callee) => matches!(&**callee, Expr::Ident(ident) if &*ident.sym == name),
        _ => false,
    }
}

pub fn strip_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => strip_parens(&paren.expr),
        other => other,
    }
}

pub fn strip_parens_mut(expr: &mut Expr) -> &mut Expr {
    match expr {
        Expr::Paren(paren) => strip_parens_mut(&mut paren.expr),
        other => other,
    }
}

fn is_static_fragment(fragment: &ExprOrSpread) -> bool {
    fragment.spread.is_none() && matches!(strip_parens(&fragment.expr), Expr::Object(_))
}

/// Collect effective fragments: each array-literal argument contributes its
/// elements, holes are dropped.
pub fn effective_fragments(args: &[ExprOrSpread]) -> Vec<&ExprOrSpread> {
    let mut fragments = Vec::with_capacity(args.len());
    for arg in args {
        match strip_parens(&arg.expr) {
            Expr::Array(array) if arg.spread.is_none() => {
                fragments.extend(array.elems.iter().flatten());
            }
            _ => fragments.push(arg),
        }
    }
    fragments
}

fn is_singular(fragments: &[&ExprOrSpread]) -> bool {
    fragments.len() == 1 && is_static_fragment(fragments[0])
}

/// Classify a `css(...)` call. `None` for a call with no fragments at all.
pub fn classify_call(call: &CallExpr, origin: SiteOrigin) -> Option<StyleSite> {
    let fragments = effective_fragments(&call.args);
    if fragments.is_empty() {
        return None;
    }

    let shape = match origin {
        SiteOrigin::Binding => SiteShape::ExtractedCallBinding,
        _ => SiteShape::CallMerge,
    };
    Some(StyleSite::new(shape, !is_singular(&fragments), origin))
}

/// Classify the expression inside a `css={...}` attribute.
///
/// Literal values (`css={null}`, `css={undefined}`, template strings) and
/// `css(...)` calls, which are sites of their own, yield `None`.
pub fn classify_attribute_value(expr: &Expr) -> Option<StyleSite> {
    let origin = SiteOrigin::Attribute;

    match strip_parens(expr) {
        Expr::Object(_) => Some(StyleSite::new(SiteShape::InlineObject, false, origin)),
        Expr::Array(array) => {
            let fragments: Vec<&ExprOrSpread> = array.elems.iter().flatten().collect();
            if fragments.is_empty() {
                return None;
            }
            Some(StyleSite::new(
                SiteShape::ArrayOfFragments,
                !is_singular(&fragments),
                origin,
            ))
        }
        Expr::Arrow(_) | Expr::Fn(_) => Some(StyleSite::new(
            SiteShape::AlreadyParameterized,
            false,
            origin,
        )),
        inner if is_helper_call(inner) => Some(StyleSite::new(
            SiteShape::AlreadyParameterized,
            false,
            origin,
        )),
        inner if is_style_builder_call(inner) => None,
        Expr::Lit(_) | Expr::Tpl(_) => None,
        Expr::Ident(ident) if &*ident.sym == "undefined" => None,
        _ => Some(StyleSite::new(SiteShape::ArrayOfFragments, true, origin)),
    }
}

/// Expression body of an arrow taking exactly the `theme` parameter, when that
/// body is an object literal or a `css(...)` call.
pub fn theme_closure_body(arrow: &mut ArrowExpr) -> Option<&mut Expr> {
    let [Pat::Ident(param)] = arrow.params.as_slice() else {
        return None;
    };
    if &*param.id.sym != THEME_PARAM {
        return None;
    }
    let BlockStmtOrExpr::Expr(body) = &mut *arrow.body else {
        return None;
    };
    let body = strip_parens_mut(body);
    if is_style_body(body) {
        Some(body)
    } else {
        None
    }
}

/// The `css(...)` call returned by an already wrapped closure, `() => css(...)`
/// or `(theme) => css(...)`.
pub fn wrapped_style_call(arrow: &mut ArrowExpr) -> Option<&mut Expr> {
    let wrapped = match arrow.params.as_slice() {
        [] => true,
        [Pat::Ident(param)] => &*param.id.sym == THEME_PARAM,
        _ => false,
    };
    if !wrapped {
        return None;
    }
    let BlockStmtOrExpr::Expr(body) = &mut *arrow.body else {
        return None;
    };
    let body = strip_parens_mut(body);
    if is_style_builder_call(body) {
        Some(body)
    } else {
        None
    }
}

fn is_style_body(expr: &Expr) -> bool {
    let expr = strip_parens(expr);
    matches!(expr, Expr::Object(_)) || is_style_builder_call(expr)
}
