//! Canonical dotted key paths
//!
//! A key path is the static form of a member-access chain: `spacing['common'].xs`
//! and `spacing.common.xs` both resolve to `spacing.common.xs`. Paths are what
//! the mapping table is keyed by, and what mapped values are built back into.

use std::fmt;

use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    ComputedPropName, Expr, Ident, IdentName, Lit, MemberExpr, MemberProp, Str,
};

/// Ordered, non-empty list of static segments. The root segment is always a
/// valid identifier and no segment is empty or contains a dot, so the dotted
/// string form round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn new(segments: Vec<String>) -> Option<Self> {
        let root = segments.first()?;
        if !is_valid_identifier(root) {
            return None;
        }
        if segments.iter().any(|s| s.is_empty() || s.contains('.')) {
            return None;
        }
        Some(Self { segments })
    }

    /// Parse `a.b.c` into a key path.
    pub fn from_dotted(dotted: &str) -> Option<Self> {
        Self::new(dotted.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_rooted_at(&self, name: &str) -> bool {
        self.root() == name
    }

    /// Resolve an identifier or member-access chain into its segments.
    ///
    /// Returns `None` when any link is not static: computed numeric or
    /// expression indexes, calls, private names, optional chains.
    pub fn parse(expr: &Expr) -> Option<Self> {
        let mut segments = Vec::new();
        if collect_segments(expr, &mut segments) {
            Self::new(segments)
        } else {
            None
        }
    }

    /// Build the left-associative member expression for this path.
    pub fn build(&self) -> Expr {
        let mut expr = Expr::Ident(Ident::new(
            self.root().into(),
            DUMMY_SP,
            SyntaxContext::empty(),
        ));

        for segment in &self.segments[1..] {
            let prop = if is_valid_identifier(segment) {
                MemberProp::Ident(IdentName::new(segment.as_str().into(), DUMMY_SP))
            } else {
                MemberProp::Computed(ComputedPropName {
                    span: DUMMY_SP,
                    expr: Box::new(Expr::Lit(Lit::Str(Str {
                        span: DUMMY_SP,
                        value: segment.as_str().into(),
                        raw: None,
                    }))),
                })
            };

            expr = Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(expr),
                prop,
            });
        }

        expr
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn collect_segments(expr: &Expr, segments: &mut Vec<String>) -> bool {
    match expr {
        Expr::Ident(ident) => {
            segments.push(ident.sym.to_string());
            true
        }
        Expr::Paren(paren) => collect_segments(&paren.expr, segments),
        Expr::Member(member) => {
            if !collect_segments(&member.obj, segments) {
                return false;
            }
            match &member.prop {
                MemberProp::Ident(name) => {
                    segments.push(name.sym.to_string());
                    true
                }
                MemberProp::Computed(computed) => match &*computed.expr {
                    Expr::Lit(Lit::Str(s)) => {
                        segments.push(s.value.to_string());
                        true
                    }
                    _ => false,
                },
                MemberProp::PrivateName(_) => false,
            }
        }
        _ => false,
    }
}

/// Check whether `name` can be written as a bare JS identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_ascii_alphabetic() && first != '_' && first != '$' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn path_of(source: &str) -> Option<String> {
        let expr = parse_expression(source).unwrap();
        KeyPath::parse(&expr).map(|p| p.to_string())
    }

    #[test]
    fn test_parse_static_chains() {
        assert_eq!(path_of("colors"), Some("colors".to_string()));
        assert_eq!(path_of("colors.red"), Some("colors.red".to_string()));
        assert_eq!(
            path_of("spacing['common'].xs"),
            Some("spacing.common.xs".to_string())
        );
        assert_eq!(path_of("(theme.color).primary"), Some("theme.color.primary".to_string()));
    }

    #[test]
    fn test_parse_rejects_dynamic_chains() {
        assert_eq!(path_of("spacing[0]"), None);
        assert_eq!(path_of("spacing[key].xs"), None);
        assert_eq!(path_of("getColors().red"), None);
        assert_eq!(path_of("colors?.red"), None);
        assert_eq!(path_of("'red'"), None);
        assert_eq!(path_of("a['b.c']"), None);
    }

    #[test]
    fn test_build_parse_round_trip() {
        for dotted in ["theme", "theme.color.primary", "fonts.h1", "a.b.c.d.e", "theme.space.2xs"] {
            let path = KeyPath::from_dotted(dotted).unwrap();
            let rebuilt = KeyPath::parse(&path.build()).unwrap();
            assert_eq!(rebuilt, path, "round trip failed for '{}'", dotted);
            assert_eq!(rebuilt.to_string(), dotted);
        }
    }

    #[test]
    fn test_build_uses_computed_members_for_non_identifiers() {
        let path = KeyPath::from_dotted("theme.space.2xs").unwrap();
        match path.build() {
            Expr::Member(member) => {
                assert!(matches!(member.prop, MemberProp::Computed(_)));
            }
            other => panic!("expected member expression, found {other:?}"),
        }
    }

    #[test]
    fn test_from_dotted_validation() {
        assert!(KeyPath::from_dotted("").is_none());
        assert!(KeyPath::from_dotted("a..b").is_none());
        assert!(KeyPath::from_dotted("1abc.x").is_none());
        assert!(KeyPath::from_dotted("theme.").is_none());
        let path = KeyPath::from_dotted("theme.color").unwrap();
        assert!(path.is_rooted_at("theme"));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("theme"));
        assert!(is_valid_identifier("$var"));
        assert!(is_valid_identifier("_private1"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2xs"));
        assert!(!is_valid_identifier("font-size"));
    }
}
