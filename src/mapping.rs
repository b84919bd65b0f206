//! Design-token mapping table
//!
//! The table is loaded once per batch and shared read-only across files. Keys
//! are either flat (`fontSize`, `colors.red`) or, for the `color` property, a
//! nested table from literal value to output path:
//!
//! ```json
//! { "fontSize": "theme.fontSize", "color": { "red": "theme.color.primary" } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use swc_core::ecma::ast::{Expr, Lit};

use crate::error::{Result, ThemifyError};
use crate::key_path::KeyPath;

/// Property whose literal values are looked up in their own table.
pub const COLOR_PROPERTY: &str = "color";

#[derive(Debug, Clone)]
enum ColorEntry {
    Table(HashMap<String, KeyPath>),
    /// Kept so the error surfaces on the first literal color lookup, which
    /// aborts only the file that needed it.
    Malformed(String),
}

/// A value found at a style property, in the form the table is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Literal(String),
    Path(KeyPath),
}

impl TokenValue {
    /// Resolve a property value. `None` means the value is not static and
    /// stays as written.
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Lit(Lit::Str(s)) => Some(Self::Literal(s.value.to_string())),
            Expr::Lit(Lit::Num(n)) => Some(Self::Literal(n.value.to_string())),
            Expr::Paren(paren) => Self::from_expr(&paren.expr),
            _ => KeyPath::parse(expr).map(Self::Path),
        }
    }

    pub fn is_rooted_at(&self, name: &str) -> bool {
        matches!(self, Self::Path(path) if path.is_rooted_at(name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    paths: HashMap<String, KeyPath>,
    color: Option<ColorEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flat entry: a property name or a dotted token path.
    pub fn insert_path(&mut self, key: impl Into<String>, output: &str) -> Result<()> {
        let key = key.into();
        let path = parse_output_path(&key, output)?;
        self.paths.insert(key, path);
        Ok(())
    }

    /// Add a `color` entry for one literal value.
    pub fn insert_color(&mut self, literal: impl Into<String>, output: &str) -> Result<()> {
        let literal = literal.into();
        let path = parse_output_path(&format!("color.{}", literal), output)?;
        match &mut self.color {
            Some(ColorEntry::Table(table)) => {
                table.insert(literal, path);
            }
            _ => {
                let mut table = HashMap::new();
                table.insert(literal, path);
                self.color = Some(ColorEntry::Table(table));
            }
        }
        Ok(())
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(ThemifyError::configuration(format!(
                "mapping must be an object, found {}",
                describe(value)
            )));
        };

        let mut table = Self::new();

        for (key, entry) in entries {
            if key == COLOR_PROPERTY {
                match entry {
                    Value::Object(colors) => {
                        for (literal, output) in colors {
                            let output = expect_path_string(&format!("color.{}", literal), output)?;
                            table.insert_color(literal.clone(), output)?;
                        }
                        if colors.is_empty() {
                            table.color = Some(ColorEntry::Table(HashMap::new()));
                        }
                    }
                    other => {
                        log::debug!("mapping[\"color\"] is {}, deferring error to first color lookup", describe(other));
                        table.color = Some(ColorEntry::Malformed(describe(other)));
                    }
                }
                continue;
            }

            let output = expect_path_string(key, entry)?;
            table.insert_path(key.clone(), output)?;
        }

        log::debug!("Loaded mapping table with {} entries", table.len());
        Ok(table)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source).map_err(|e| {
            ThemifyError::invalid_format(format!("Invalid JSON mapping: {}", e))
        })?;
        Self::from_value(&value)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let value: Value = toml::from_str(source).map_err(|e| {
            ThemifyError::invalid_format(format!("Invalid TOML mapping: {}", e))
        })?;
        Self::from_value(&value)
    }

    /// Load a `.json` or `.toml` mapping file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ThemifyError::FileNotFound {
            path: format!("Mapping file {}: {}", path.display(), e),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ThemifyError::invalid_format(
                "Mapping file must be .json or .toml format",
            )),
        }
    }

    /// Find the replacement path for `value` found under `property`.
    ///
    /// Priority: literal color table, then the whole token path, then the
    /// property name alone. A literal color lookup against a malformed
    /// `color` entry is a configuration error.
    pub fn lookup(&self, property: &str, value: &TokenValue) -> Result<Option<&KeyPath>> {
        if property == COLOR_PROPERTY {
            if let TokenValue::Literal(literal) = value {
                match &self.color {
                    Some(ColorEntry::Table(table)) => {
                        if let Some(path) = table.get(literal) {
                            return Ok(Some(path));
                        }
                    }
                    Some(ColorEntry::Malformed(found)) => {
                        return Err(ThemifyError::configuration(format!(
                            "mapping[\"color\"] must be a table of literal values, found {}",
                            found
                        )));
                    }
                    None => {}
                }
            }
        }

        if let TokenValue::Path(path) = value {
            if path.len() > 1 {
                if let Some(output) = self.paths.get(&path.to_string()) {
                    return Ok(Some(output));
                }
            }
        }

        Ok(self.paths.get(property))
    }

    pub fn len(&self) -> usize {
        let colors = match &self.color {
            Some(ColorEntry::Table(table)) => table.len(),
            _ => 0,
        };
        self.paths.len() + colors
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries as `(key, output)` pairs, sorted by key. Color entries are
    /// keyed `color[<literal>]`.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .paths
            .iter()
            .map(|(key, path)| (key.clone(), path.to_string()))
            .collect();

        if let Some(ColorEntry::Table(table)) = &self.color {
            entries.extend(
                table
                    .iter()
                    .map(|(literal, path)| (format!("color[{}]", literal), path.to_string())),
            );
        }

        entries.sort();
        entries
    }

    /// Color literals that are also flat token paths. The priority order
    /// decides which one wins, but such configs are usually a mistake.
    pub fn overlaps(&self) -> Vec<String> {
        let Some(ColorEntry::Table(table)) = &self.color else {
            return Vec::new();
        };

        let mut overlaps: Vec<String> = table
            .iter()
            .filter_map(|(literal, color_path)| {
                self.paths.get(literal).map(|flat_path| {
                    format!(
                        "'{}' maps to {} as a color literal and to {} as a token path",
                        literal, color_path, flat_path
                    )
                })
            })
            .collect();
        overlaps.sort();
        overlaps
    }
}

fn expect_path_string<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ThemifyError::configuration(format!(
            "mapping[\"{}\"] must be a dotted path string, found {}",
            key,
            describe(value)
        ))
    })
}

fn parse_output_path(key: &str, output: &str) -> Result<KeyPath> {
    KeyPath::from_dotted(output).ok_or_else(|| {
        ThemifyError::configuration(format!(
            "mapping[\"{}\"] has invalid output path '{}'",
            key, output
        ))
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string \"{}\"", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
