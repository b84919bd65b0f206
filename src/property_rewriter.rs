//! Token-to-theme rewriting of property values inside a style site

use swc_core::ecma::ast::{Expr, ObjectLit, Prop, PropName, PropOrSpread};

use crate::classifier::{calls_style_builder, theme_closure_body};
use crate::constants::THEME_PARAM;
use crate::error::Result;
use crate::mapping::{MappingTable, TokenValue};

/// Rewrites property values bottom-up: nested objects, array elements and
/// template holes first, then the value itself. Anything that is not a
/// literal or a static key path is left exactly as written.
pub struct PropertyRewriter<'a> {
    mapping: &'a MappingTable,
    rewritten: usize,
}

impl<'a> PropertyRewriter<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self {
            mapping,
            rewritten: 0,
        }
    }

    /// Number of values replaced so far.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    /// Rewrite every object-literal fragment of a site: the object itself,
    /// the elements of an array of fragments, the arguments of a `css` call,
    /// or the body of a `(theme) => ...` closure in one of those slots.
    /// Dynamic fragments are not entered.
    pub fn rewrite_fragment(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Object(object) => self.rewrite_object(object),
            Expr::Paren(paren) => self.rewrite_fragment(&mut paren.expr),
            Expr::Array(array) => {
                for element in array.elems.iter_mut().flatten() {
                    if element.spread.is_none() {
                        self.rewrite_fragment(&mut element.expr)?;
                    }
                }
                Ok(())
            }
            Expr::Call(call) if calls_style_builder(call) => {
                for arg in call.args.iter_mut() {
                    if arg.spread.is_none() {
                        self.rewrite_fragment(&mut arg.expr)?;
                    }
                }
                Ok(())
            }
            Expr::Arrow(arrow) => match theme_closure_body(arrow) {
                Some(body) => self.rewrite_fragment(body),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    pub fn rewrite_object(&mut self, object: &mut ObjectLit) -> Result<()> {
        for prop in object.props.iter_mut() {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(key_value) = &mut **prop else {
                continue;
            };
            let Some(name) = prop_name(&key_value.key) else {
                continue;
            };
            self.rewrite_value(&name, &mut key_value.value)?;
        }
        Ok(())
    }

    fn rewrite_value(&mut self, property: &str, value: &mut Expr) -> Result<()> {
        match value {
            Expr::Object(object) => return self.rewrite_object(object),
            Expr::Array(array) => {
                for element in array.elems.iter_mut().flatten() {
                    if element.spread.is_none() {
                        self.rewrite_value(property, &mut element.expr)?;
                    }
                }
                return Ok(());
            }
            Expr::Tpl(template) => {
                for hole in template.exprs.iter_mut() {
                    self.rewrite_value(property, hole)?;
                }
                return Ok(());
            }
            _ => {}
        }

        let Some(token) = TokenValue::from_expr(value) else {
            log::trace!("'{}': value is not static, left as written", property);
            return Ok(());
        };

        if token.is_rooted_at(THEME_PARAM) {
            return Ok(());
        }

        match self.mapping.lookup(property, &token)? {
            Some(output) => {
                if matches!(&token, TokenValue::Path(path) if path == output) {
                    return Ok(());
                }
                log::trace!("'{}': {:?} -> {}", property, token, output);
                *value = output.build();
                self.rewritten += 1;
            }
            None => {
                log::trace!("'{}': no mapping for {:?}", property, token);
            }
        }

        Ok(())
    }
}

/// Static name of a property key. Computed and numeric keys have none.
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}
