//! Themify
//!
//! Rewrites design-token references inside `css` style definitions into
//! theme-accessor expressions, and re-parameterizes every style expression
//! that ends up depending on the theme.
//!
//! # Features
//!
//! - Token lookup by property name, by whole key path, or by literal color
//! - Inline objects, bound `css(...)` calls, fragment arrays and nested calls
//! - Closures parameterized only when the theme is actually read
//! - Merged fragments routed through a shared `applyTheme` helper
//! - Helper import injection and unused import pruning
//! - JSON or TOML mapping files
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use themify::{transform_file, MappingTable, RewriteOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mapping = MappingTable::load("mapping.json")?;
//!     let output = transform_file("Button.tsx", &mapping, &RewriteOptions::default())?;
//!     println!("{}", output.code);
//!     Ok(())
//! }
//! ```
//!
//! # Rewrite Pipeline
//!
//! Each file goes through one linear pass:
//!
//! 1. **Parse** - swc parser, dialect chosen by file extension
//! 2. **Rewrite** - style sites handled post-order, properties bottom-up
//! 3. **Inject** - helper import added when a site was merged
//! 4. **Prune** - imports left without references are removed
//! 5. **Print** - swc code generator, comments preserved

pub mod classifier;
pub mod cli;
pub mod codegen;
pub mod constants;
pub mod engine;
pub mod error;
pub mod imports;
pub mod key_path;
pub mod mapping;
pub mod parser;
pub mod property_rewriter;
pub mod theme_ref;
pub mod wrapper;

use serde::Serialize;
use std::fs;
use std::path::Path;

// Re-export commonly used types and functions
pub use classifier::{SiteOrigin, SiteShape, StyleSite};
pub use cli::EnhancedCli;
pub use codegen::{print_module, print_parsed};
pub use engine::{rewrite_module, Engine, RewriteState};
pub use error::{Result, ThemifyError};
pub use key_path::KeyPath;
pub use mapping::{MappingTable, TokenValue};
pub use parser::{parse_module, ParsedModule, SourceSyntax};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Rewrite options and settings
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Module the helper import is injected from, used verbatim
    pub helper_module: String,

    /// Remove import bindings left without references
    pub prune_imports: bool,

    /// Import bindings never pruned even when unreferenced
    pub retained_imports: Vec<String>,

    /// Annotate the injected parameter as `theme: Theme`. Always off for
    /// JavaScript sources.
    pub annotate_theme_param: bool,

    /// Enable debug mode with extra logging
    pub debug_mode: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            helper_module: constants::DEFAULT_HELPER_MODULE.to_string(),
            prune_imports: true,
            retained_imports: constants::DEFAULT_RETAINED_IMPORTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            annotate_theme_param: true,
            debug_mode: false,
        }
    }
}

/// Per-file rewrite statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Style sites recognized, skipped ones included
    pub sites_found: usize,

    /// Singular sites wrapped in a closure
    pub sites_wrapped: usize,

    /// Wrapped sites whose closure takes the theme parameter
    pub sites_parameterized: usize,

    /// Mergeable sites routed through the helper
    pub sites_merged: usize,

    /// Sites already parameterized, left as written
    pub sites_skipped: usize,

    /// Property values replaced with theme accessors
    pub properties_rewritten: usize,

    /// Whether the helper import was injected
    pub helper_injected: bool,

    /// Import specifiers removed by pruning
    pub imports_pruned: usize,
}

impl RewriteStats {
    /// Whether the pass modified the tree at all.
    pub fn has_changes(&self) -> bool {
        self.sites_wrapped > 0
            || self.sites_merged > 0
            || self.properties_rewritten > 0
            || self.helper_injected
            || self.imports_pruned > 0
    }
}

/// Result of rewriting one source file
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Printed module. Equal to the input when nothing changed.
    pub code: String,
    pub changed: bool,
    pub stats: RewriteStats,
}

/// Rewrite a source string. `filename` selects the dialect and is used in
/// error messages.
pub fn transform_source(
    source: &str,
    filename: &str,
    mapping: &MappingTable,
    options: &RewriteOptions,
) -> Result<TransformOutput> {
    if source.trim().is_empty() {
        log::debug!("Skipping empty source '{}'", filename);
        return Ok(TransformOutput {
            code: source.to_string(),
            changed: false,
            stats: RewriteStats::default(),
        });
    }

    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::info!("Rewriting '{}'...", filename);
        log::debug!("Rewrite options: {:?}", options);
    }

    let mut parsed = parse_module(source, filename)?;

    let mut file_options = options.clone();
    file_options.annotate_theme_param &= parsed.syntax.supports_type_annotations();

    let stats = Engine::new(mapping, &file_options).rewrite(&mut parsed.module)?;

    if options.debug_mode {
        log::debug!("Full stats: {:?}", stats);
    }

    if !stats.has_changes() {
        return Ok(TransformOutput {
            code: source.to_string(),
            changed: false,
            stats,
        });
    }

    let code = print_parsed(&parsed)?;
    Ok(TransformOutput {
        code,
        changed: true,
        stats,
    })
}

/// Read and rewrite a file without touching it on disk.
pub fn transform_file(
    path: impl AsRef<Path>,
    mapping: &MappingTable,
    options: &RewriteOptions,
) -> Result<TransformOutput> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| ThemifyError::FileNotFound {
        path: format!("{}: {}", path.display(), e),
    })?;

    transform_source(&source, &path.to_string_lossy(), mapping, options)
}

/// Rewrite a file in place. The file is only written when it changed.
pub fn rewrite_file(
    path: impl AsRef<Path>,
    mapping: &MappingTable,
    options: &RewriteOptions,
) -> Result<TransformOutput> {
    let path = path.as_ref();
    let output = transform_file(path, mapping, options)?;

    if output.changed {
        fs::write(path, &output.code)?;
        log::info!("Rewrote '{}'", path.display());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MAPPING: &str = r#"{
        "fontSize": "theme.fontSize",
        "colors.red": "theme.palette.red",
        "spacing.xs": "theme.space.xs",
        "color": { "red": "theme.color.primary" }
    }"#;

    fn mapping() -> MappingTable {
        MappingTable::from_json_str(MAPPING).unwrap()
    }

    fn transform(source: &str, filename: &str) -> TransformOutput {
        transform_source(source, filename, &mapping(), &RewriteOptions::default()).unwrap()
    }

    /// Print `source` through the same parser and printer, unmodified.
    fn reprint(source: &str, filename: &str) -> String {
        print_parsed(&parse_module(source, filename).unwrap()).unwrap()
    }

    fn assert_rewrites(source: &str, expected: &str) {
        let output = transform(source, "test.tsx");
        assert!(output.changed);
        assert_eq!(output.code, reprint(expected, "test.tsx"));
    }

    #[test]
    fn test_color_literal_takes_priority() {
        assert_rewrites(
            r#"const a = <div css={{ color: "red" }} />;"#,
            r#"const a = <div css={(theme: Theme) => ({ color: theme.color.primary })} />;"#,
        );
        assert_rewrites(
            r#"const b = <div css={{ color: colors.red }} />;"#,
            r#"const b = <div css={(theme: Theme) => ({ color: theme.palette.red })} />;"#,
        );
    }

    #[test]
    fn test_no_match_passthrough() {
        assert_rewrites(
            r##"const a = <div css={{ color: "#ccc" }} />;"##,
            r##"const a = <div css={() => ({ color: "#ccc" })} />;"##,
        );
    }

    #[test]
    fn test_bound_call_site() {
        assert_rewrites(
            r#"const title = css({ fontSize: 14, margin: 0 });"#,
            r#"const title = (theme: Theme) => css({ fontSize: theme.fontSize, margin: 0 });"#,
        );
    }

    #[test]
    fn test_nested_call_in_attribute() {
        assert_rewrites(
            r#"const a = <p css={css({ fontSize: 12 })} />;"#,
            r#"const a = <p css={(theme: Theme) => css({ fontSize: theme.fontSize })} />;"#,
        );
    }

    #[test]
    fn test_merge_flattens_and_injects_helper_once() {
        let output = transform(r#"const a = css(base, [{ color: "red" }]);"#, "test.tsx");
        assert_eq!(
            output.code,
            reprint(
                r#"import { applyTheme } from "./applyTheme"; const a = applyTheme(base, { color: theme.color.primary });"#,
                "test.tsx"
            )
        );
        assert!(output.stats.helper_injected);
        assert_eq!(output.code.matches("import { applyTheme }").count(), 1);

        let again = transform(&output.code, "test.tsx");
        assert!(!again.changed);
        assert_eq!(again.code.matches("import { applyTheme }").count(), 1);
    }

    #[test]
    fn test_array_attribute() {
        assert_rewrites(
            r#"const a = <div css={[{ fontSize: 12 }]} />;"#,
            r#"const a = <div css={(theme: Theme) => ({ fontSize: theme.fontSize })} />;"#,
        );
        assert_rewrites(
            r#"import { applyTheme } from "./applyTheme"; const a = <div css={[base, { margin: 0 }, active && extra]} />;"#,
            r#"import { applyTheme } from "./applyTheme"; const a = <div css={applyTheme(base, { margin: 0 }, active && extra)} />;"#,
        );
    }

    #[test]
    fn test_dynamic_attribute_value_merges() {
        let output = transform(r#"const a = <div css={active ? on : off} />;"#, "test.tsx");
        assert_eq!(
            output.code,
            reprint(
                r#"import { applyTheme } from "./applyTheme"; const a = <div css={applyTheme(active ? on : off)} />;"#,
                "test.tsx"
            )
        );
    }

    #[test]
    fn test_theme_closure_in_attribute_is_rewritten_not_rewrapped() {
        assert_rewrites(
            r#"const a = <div css={(theme: Theme) => ({ border: `1px solid ${colors.red}`, color: theme.color.text })} />;"#,
            r#"const a = <div css={(theme: Theme) => ({ border: `1px solid ${theme.palette.red}`, color: theme.color.text })} />;"#,
        );
    }

    #[test]
    fn test_closures_outside_style_sites_are_untouched() {
        let source = "const sizes = themes.map((theme) => ({ fontSize: 12 }));\n";
        let output = transform(source, "test.tsx");
        assert!(!output.changed);
        assert_eq!(output.code, source);
    }

    #[test]
    fn test_nested_call_inside_parameterless_closure() {
        assert_rewrites(
            r#"const s = useMemo(() => ({ title: css({ fontSize: 12 }) }), []);"#,
            r#"const s = useMemo(() => ({ title: (theme: Theme) => css({ fontSize: theme.fontSize }) }), []);"#,
        );

        let once = transform(r#"const s = useMemo(() => ({ title: css({ fontSize: 12 }) }), []);"#, "test.tsx");
        let twice = transform(&once.code, "test.tsx");
        assert!(!twice.changed);
    }

    #[test]
    fn test_style_attribute_without_expression_is_skipped() {
        for source in [
            "const a = <div css />;\n",
            "const b = <div css=\"color: red\" />;\n",
        ] {
            let output = transform(source, "test.tsx");
            assert!(!output.changed, "for {}", source);
            assert_eq!(output.code, source);
            assert_eq!(output.stats.sites_found, 0);
        }
    }

    #[test]
    fn test_prune_keeps_helper_and_drops_unused() {
        assert_rewrites(
            r#"import { applyTheme, other } from "./applyTheme"; const a = <div css={applyTheme(base)} />;"#,
            r#"import { applyTheme } from "./applyTheme"; const a = <div css={applyTheme(base)} />;"#,
        );
    }

    #[test]
    fn test_prune_removes_emptied_import() {
        assert_rewrites(
            r#"import { spacing } from "./tokens"; const a = <div css={{ margin: spacing.xs }} />;"#,
            r#"const a = <div css={(theme: Theme) => ({ margin: theme.space.xs })} />;"#,
        );
    }

    #[test]
    fn test_pruning_can_be_disabled() {
        let options = RewriteOptions {
            prune_imports: false,
            ..Default::default()
        };
        let source = r#"import { spacing } from "./tokens"; const a = <div css={{ margin: spacing.xs }} />;"#;
        let output = transform_source(source, "test.tsx", &mapping(), &options).unwrap();
        assert!(output.code.contains("./tokens"));
        assert_eq!(output.stats.imports_pruned, 0);
    }

    #[test]
    fn test_javascript_param_is_not_annotated() {
        let source = r#"const a = <div css={{ color: "red" }} />;"#;
        let output = transform(source, "Button.jsx");
        assert_eq!(
            output.code,
            reprint(
                r#"const a = <div css={(theme) => ({ color: theme.color.primary })} />;"#,
                "Button.jsx"
            )
        );
    }

    #[test]
    fn test_idempotence() {
        let sources = [
            r#"const a = <div css={{ color: "red", fontSize: 12 }} />;"#,
            r#"const b = css(base, { margin: spacing.xs });"#,
            r#"const c = <div css={[{ margin: 0 }, more]} />;"#,
            r##"const d = <div css={{ color: "#ccc" }} />;"##,
        ];

        for source in sources {
            let once = transform(source, "test.tsx");
            let twice = transform(&once.code, "test.tsx");
            assert!(!twice.changed, "second pass changed {}", source);
            assert_eq!(twice.code, once.code, "for {}", source);
        }
    }

    #[test]
    fn test_untouched_source_is_returned_verbatim() {
        let source = "const a = 1;\n\n// unrelated\nexport default a;\n";
        let output = transform(source, "test.ts");
        assert!(!output.changed);
        assert_eq!(output.code, source);

        let empty = transform("   \n", "empty.tsx");
        assert!(!empty.changed);
        assert_eq!(empty.code, "   \n");
    }

    #[test]
    fn test_directive_and_comments_survive() {
        let source = r#""use client"; // header
const a = <div css={[x, y]} />;"#;
        let output = transform(source, "test.tsx");
        let directive = output.code.find("\"use client\"").unwrap();
        let import = output.code.find("import { applyTheme }").unwrap();
        assert!(directive < import);
        assert!(output.code.contains("// header"));
    }

    #[test]
    fn test_configuration_error() {
        let table = MappingTable::from_json_str(r#"{ "color": "theme.color" }"#).unwrap();
        let err = transform_source(
            r#"const a = <div css={{ color: "red" }} />;"#,
            "test.tsx",
            &table,
            &RewriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ThemifyError::Configuration { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = transform_source("const = ;", "broken.tsx", &mapping(), &RewriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, ThemifyError::Parse { ref file, .. } if file == "broken.tsx"));
    }

    #[test]
    fn test_rewrite_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Title.tsx");
        fs::write(&path, r#"export const Title = () => <h1 css={{ fontSize: 24 }} />;"#).unwrap();

        let options = RewriteOptions::default();
        let first = rewrite_file(&path, &mapping(), &options).unwrap();
        assert!(first.changed);
        assert_eq!(first.stats.properties_rewritten, 1);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("theme.fontSize"));

        let second = rewrite_file(&path, &mapping(), &options).unwrap();
        assert!(!second.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_missing_file() {
        let err = transform_file("does/not/exist.tsx", &mapping(), &RewriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, ThemifyError::FileNotFound { .. }));
    }
}
