//! Theme catalog and appearance resolution

use std::collections::HashMap;

/// Appearance a theme declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
    /// Follow the host's live preference
    Auto,
}

impl Appearance {
    /// Parse a catalog value; anything unrecognised is light
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Appearance::Dark,
            "auto" => Appearance::Auto,
            "light" => Appearance::Light,
            other => {
                log::debug!("Unknown appearance {:?}, using light", other);
                Appearance::Light
            }
        }
    }
}

/// Resolved light/dark class applied to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceClass {
    Light,
    Dark,
}

impl AppearanceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppearanceClass::Light => "light",
            AppearanceClass::Dark => "dark",
        }
    }
}

/// Themes shipped with the viewer
pub const BUILTIN_THEMES: [(&str, Appearance); 4] = [
    ("github", Appearance::Light),
    ("github-dark", Appearance::Dark),
    ("jupyter", Appearance::Light),
    ("custom", Appearance::Auto),
];

/// Look up a theme: delivered catalog first, then the built-ins, then light
pub fn appearance_of(theme: &str, catalog: &HashMap<String, String>) -> Appearance {
    if let Some(value) = catalog.get(theme) {
        return Appearance::parse(value);
    }
    BUILTIN_THEMES
        .iter()
        .find(|(name, _)| *name == theme)
        .map(|(_, appearance)| *appearance)
        .unwrap_or_default()
}

/// Resolve the appearance class for one render
pub fn resolve(theme: &str, catalog: &HashMap<String, String>, prefers_dark: bool) -> AppearanceClass {
    match appearance_of(theme, catalog) {
        Appearance::Dark => AppearanceClass::Dark,
        Appearance::Auto if prefers_dark => AppearanceClass::Dark,
        _ => AppearanceClass::Light,
    }
}

/// Whether a theme styles content with GitHub markup classes
pub fn uses_github_markup(theme: &str) -> bool {
    matches!(theme, "github" | "github-dark")
}
