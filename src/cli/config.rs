// FILE: src/cli/config.rs

use crate::error::{Result, ThemifyError};
use serde::{Deserialize, Serialize};
use std::fs;

/// Project configuration. Every field is optional; command-line flags take
/// precedence over whatever is set here.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub mapping: Option<String>,
    pub helper_module: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub prune_imports: Option<bool>,
    pub retained_imports: Option<Vec<String>>,
    pub annotate_theme_param: Option<bool>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        ThemifyError::FileNotFound {
            path: format!("Config file {}: {}", config_path, e),
        }
    })?;

    let config = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content)
            .map_err(|e| ThemifyError::invalid_format(format!("Invalid JSON config: {}", e)))?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content)
            .map_err(|e| ThemifyError::invalid_format(format!("Invalid TOML config: {}", e)))?
    } else {
        return Err(ThemifyError::invalid_format(
            "Config file must be .json or .toml format",
        ));
    };

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}
