// FILE: src/constants.rs

// Reserved names (not configurable)
pub const THEME_PARAM: &str = "theme";
pub const THEME_TYPE: &str = "Theme";
pub const STYLE_BUILDER: &str = "css";
pub const HELPER_FN: &str = "applyTheme";

// JSX attribute carrying a style value
pub const STYLE_ATTRIBUTE: &str = "css";

// Defaults
pub const DEFAULT_HELPER_MODULE: &str = "./applyTheme";
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];
pub const DEFAULT_RETAINED_IMPORTS: &[&str] = &["React"]; // used implicitly by classic JSX
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    r"\.(test|spec)\.[jt]sx?$",
    r"(^|[/\\])__tests__[/\\]",
    r"(^|[/\\])node_modules[/\\]",
];
