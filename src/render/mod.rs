//! Rendering capabilities for nbview
//!
//! The viewer never calls a markdown engine, highlighter or math typesetter
//! directly. It looks them up in a [`Capabilities`] set, so any of them can
//! be swapped out or left absent:
//! - `markdown`: pulldown-cmark engine with emoji shortcode expansion
//! - `highlight`: syntect class-based highlighter
//! - `math`: KaTeX typesetting of delimited TeX
//! - `emoji`: shortcode table

pub mod emoji;
pub mod highlight;
pub mod markdown;
pub mod math;

pub use highlight::SyntectHighlighter;
pub use markdown::CmarkEngine;
pub use math::KatexMathEngine;

use std::collections::HashMap;
use std::sync::Arc;

/// Compiler names served by the bundled markdown engine
pub const BUNDLED_COMPILERS: [&str; 3] = ["marked", "commonmark", "pulldown-cmark"];

/// Per-call options for a markdown engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Expand `:shortcode:` emoji in prose text
    pub emoji: bool,
}

/// Converts markdown prose into an HTML fragment
pub trait MarkdownEngine: Send + Sync {
    fn render(&self, markdown: &str, options: &MarkdownOptions) -> String;
}

/// Highlights every code block found in an HTML region
pub trait Highlighter: Send + Sync {
    fn highlight_region(&self, html: &str) -> String;
}

/// Typesets math delimiters found in an HTML region
pub trait MathEngine: Send + Sync {
    fn typeset_region(&self, html: &str) -> String;
}

/// The set of rendering services available to the viewer
#[derive(Clone, Default)]
pub struct Capabilities {
    engines: HashMap<String, Arc<dyn MarkdownEngine>>,
    highlighter: Option<Arc<dyn Highlighter>>,
    math: Option<Arc<dyn MathEngine>>,
}

impl Capabilities {
    /// No capabilities at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Everything bundled with nbview
    pub fn bundled() -> Self {
        let engine: Arc<dyn MarkdownEngine> = Arc::new(CmarkEngine::new());
        let mut capabilities = Self::empty()
            .with_highlighter(Arc::new(SyntectHighlighter::new()))
            .with_math(Arc::new(KatexMathEngine::new()));
        for name in BUNDLED_COMPILERS {
            capabilities = capabilities.with_engine(name, Arc::clone(&engine));
        }
        capabilities
    }

    /// Register a markdown engine under a compiler name
    pub fn with_engine(mut self, name: impl Into<String>, engine: Arc<dyn MarkdownEngine>) -> Self {
        self.engines.insert(name.into(), engine);
        self
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn with_math(mut self, math: Arc<dyn MathEngine>) -> Self {
        self.math = Some(math);
        self
    }

    /// Look up the markdown engine for a compiler name
    pub fn engine(&self, compiler: &str) -> Option<Arc<dyn MarkdownEngine>> {
        self.engines.get(compiler).cloned()
    }

    pub fn highlighter(&self) -> Option<&dyn Highlighter> {
        self.highlighter.as_deref()
    }

    pub fn math(&self) -> Option<&dyn MathEngine> {
        self.math.as_deref()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut engines: Vec<_> = self.engines.keys().collect();
        engines.sort();
        f.debug_struct("Capabilities")
            .field("engines", &engines)
            .field("highlighter", &self.highlighter.is_some())
            .field("math", &self.math.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_capabilities() {
        let capabilities = Capabilities::bundled();
        for name in BUNDLED_COMPILERS {
            assert!(capabilities.engine(name).is_some(), "missing engine {}", name);
        }
        assert!(capabilities.engine("unknown").is_none());
        assert!(capabilities.highlighter().is_some());
        assert!(capabilities.math().is_some());
    }

    #[test]
    fn test_empty_capabilities() {
        let capabilities = Capabilities::empty();
        assert!(capabilities.engine("marked").is_none());
        assert!(capabilities.highlighter().is_none());
        assert!(capabilities.math().is_none());
    }
}
