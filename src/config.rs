//! Configuration management for nbview
//!
//! Handles loading and managing viewer configuration. Configuration is read
//! from `<config dir>/nbview/config.json` when present; every field has a
//! default so partial files are accepted.

use crate::error::{ConfigError, ConfigResult};
use crate::message::{ContentOptions, InitPayload};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application identifier used for the configuration directory
pub const APP_ID: &str = "nbview";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE: &str = "config.json";

/// Maximum notebook size to open (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Autoreload polling interval in milliseconds
pub const DEFAULT_AUTORELOAD_INTERVAL_MS: u64 = 1000;

/// Default markdown engine name
pub const DEFAULT_COMPILER: &str = "marked";

/// Default theme name
pub const DEFAULT_THEME: &str = "github";

/// Environment variable consulted when the colour scheme follows the system
pub const COLOR_SCHEME_ENV: &str = "NBVIEW_COLOR_SCHEME";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial viewer settings
    pub viewer: ViewerConfig,

    /// Source file handling
    pub files: FileConfig,

    /// Page/UI settings
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the user config directory or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE))
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.files.autoreload_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "files.autoreload_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.viewer.theme.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "viewer.theme".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Build the initialization payload for a freshly read source
    pub fn init_payload(&self, raw: String) -> InitPayload {
        InitPayload {
            theme: self.viewer.theme.clone(),
            raw,
            themes: self.viewer.themes.clone(),
            content: self.viewer.content,
            compiler: self.viewer.compiler.clone(),
            raw_mode: self.viewer.raw_mode,
        }
    }
}

/// Initial viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Theme name
    pub theme: String,

    /// Theme-to-appearance catalog overrides
    pub themes: HashMap<String, String>,

    /// Content options
    pub content: ContentOptions,

    /// Markdown engine name
    pub compiler: String,

    /// Start in raw mode
    pub raw_mode: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            themes: HashMap::new(),
            content: ContentOptions::default(),
            compiler: DEFAULT_COMPILER.to_string(),
            raw_mode: false,
        }
    }
}

/// Source file handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Poll the notebook for changes
    pub autoreload: bool,

    /// Polling interval in milliseconds
    pub autoreload_interval_ms: u64,

    /// Maximum file size to open (in bytes)
    pub max_file_size: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            autoreload: false,
            autoreload_interval_ms: DEFAULT_AUTORELOAD_INTERVAL_MS,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// Page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base path or URL prefix for `themes/<name>.css`
    pub assets_base: String,

    /// Host colour-scheme preference
    pub color_scheme: ColorSchemePreference,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            assets_base: String::new(),
            color_scheme: ColorSchemePreference::System,
        }
    }
}

/// Host colour-scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorSchemePreference {
    /// Follow the environment
    #[default]
    System,
    /// Always prefer light
    Light,
    /// Always prefer dark
    Dark,
}

impl ColorSchemePreference {
    /// Resolve to a concrete dark/light answer
    pub fn prefers_dark(&self) -> bool {
        match self {
            ColorSchemePreference::Light => false,
            ColorSchemePreference::Dark => true,
            ColorSchemePreference::System => std::env::var(COLOR_SCHEME_ENV)
                .map(|v| v.eq_ignore_ascii_case("dark"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.viewer.theme, "github");
        assert_eq!(config.viewer.compiler, "marked");
        assert!(config.viewer.content.toc);
        assert!(!config.files.autoreload);
        assert_eq!(config.files.autoreload_interval_ms, 1000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.viewer.theme, deserialized.viewer.theme);
        assert_eq!(config.ui.color_scheme, deserialized.ui.color_scheme);
    }

    #[test]
    fn test_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"viewer":{"theme":"github-dark"},"ui":{"color_scheme":"dark"}}"#)
                .unwrap();
        assert_eq!(config.viewer.theme, "github-dark");
        assert_eq!(config.viewer.compiler, "marked");
        assert!(config.ui.color_scheme.prefers_dark());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.files.autoreload_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_init_payload() {
        let payload = Config::default().init_payload("{}".to_string());
        assert_eq!(payload.raw, "{}");
        assert_eq!(payload.theme, "github");
        assert!(!payload.raw_mode);
    }
}
