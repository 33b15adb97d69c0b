//! Notebook parsing and rendering
//!
//! Converts raw notebook text into its notebook model and an HTML fragment.
//! Parsing is pure: the same text, engine and options always produce the
//! same fragment.

mod cells;
pub mod model;

use model::Notebook;

use crate::error::{ParseError, ParseResult};
use crate::message::ContentOptions;
use crate::render::{Capabilities, MarkdownEngine, MarkdownOptions};
use crate::utils::html;
use cells::CellRenderer;
use std::sync::Arc;

/// Result of a successful parse
#[derive(Debug, Clone)]
pub struct ParsedNotebook {
    /// Rendered HTML fragment
    pub html: String,
    /// Structured notebook
    pub notebook: Notebook,
}

/// Parser bound to one markdown engine and one set of content options
#[derive(Clone)]
pub struct NotebookParser {
    engine: Option<Arc<dyn MarkdownEngine>>,
    compiler: String,
    options: MarkdownOptions,
}

impl NotebookParser {
    /// Bind the engine registered for `compiler`, if any
    pub fn new(capabilities: &Capabilities, compiler: &str, content: &ContentOptions) -> Self {
        Self {
            engine: capabilities.engine(compiler),
            compiler: compiler.to_string(),
            options: MarkdownOptions {
                emoji: content.emoji_expansion(),
            },
        }
    }

    /// Parse raw notebook text into HTML
    pub fn parse(&self, raw: &str) -> ParseResult<ParsedNotebook> {
        let notebook: Notebook =
            serde_json::from_str(raw).map_err(|e| ParseError::MalformedSource(e.to_string()))?;
        log::debug!("Notebook decoded: {} cells", notebook.cells.len());

        let engine = self.engine.as_deref().ok_or_else(|| ParseError::EngineMissing {
            compiler: self.compiler.clone(),
        })?;

        let html = CellRenderer::new(engine, self.options, &notebook).render_notebook(&notebook);
        log::debug!("Notebook rendered: {} bytes of HTML", html.len());

        Ok(ParsedNotebook { html, notebook })
    }
}

impl std::fmt::Debug for NotebookParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookParser")
            .field("compiler", &self.compiler)
            .field("engine", &self.engine.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// Placeholder fragment shown in place of a document that failed to parse
pub fn error_fragment(error: &ParseError) -> String {
    format!(
        "<div class=\"nb-parse-error\" style=\"padding:20px;color:red;\">{}</div>",
        html::escape(&error.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CmarkEngine;

    const SAMPLE: &str = r###"{
        "cells": [
            {"cell_type": "markdown", "source": ["# Title\n", "Intro :rocket:"]},
            {"cell_type": "code", "execution_count": 1, "source": "1 + 1",
             "outputs": [{"output_type": "execute_result", "execution_count": 1, "data": {"text/plain": "2"}}]},
            {"cell_type": "markdown", "source": "## Details"}
        ],
        "metadata": {"language_info": {"name": "python"}},
        "nbformat": 4,
        "nbformat_minor": 5
    }"###;

    fn parser(content: ContentOptions) -> NotebookParser {
        let capabilities = Capabilities::empty().with_engine("marked", Arc::new(CmarkEngine::new()));
        NotebookParser::new(&capabilities, "marked", &content)
    }

    #[test]
    fn test_parse_sample() {
        let parsed = parser(ContentOptions::default()).parse(SAMPLE).unwrap();
        assert_eq!(parsed.notebook.cells.len(), 3);
        assert_eq!(parsed.notebook.nbformat, 4);
        assert!(parsed.html.contains(r#"<h1 id="h-1">Title</h1>"#));
        assert!(parsed.html.contains(r#"<h2 id="h-2">Details</h2>"#));
        assert!(parsed.html.contains(r#"<pre class="nb-text-output">2</pre>"#));
    }

    #[test]
    fn test_heading_counter_restarts_per_parse() {
        let parser = parser(ContentOptions::default());
        let first = parser.parse(SAMPLE).unwrap();
        let second = parser.parse(SAMPLE).unwrap();
        assert_eq!(first.html, second.html);
        assert!(!second.html.contains("h-3"));
    }

    #[test]
    fn test_emoji_option() {
        let with = parser(ContentOptions {
            emoji: true,
            ..ContentOptions::default()
        })
        .parse(SAMPLE)
        .unwrap();
        assert!(with.html.contains("Intro 🚀"));

        let without = parser(ContentOptions::default()).parse(SAMPLE).unwrap();
        assert!(without.html.contains("Intro :rocket:"));
    }

    #[test]
    fn test_malformed_source() {
        let err = parser(ContentOptions::default()).parse("not json at all").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSource(_)));

        let err = parser(ContentOptions::default()).parse(r#"{"worksheets": []}"#).unwrap_err();
        match err {
            ParseError::MalformedSource(message) => assert!(message.contains("cells")),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parser(ContentOptions::default()).parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSource(_)));
    }

    #[test]
    fn test_engine_missing() {
        let parser = NotebookParser::new(&Capabilities::empty(), "marked", &ContentOptions::default());
        let err = parser.parse(SAMPLE).unwrap_err();
        assert_eq!(
            err,
            ParseError::EngineMissing {
                compiler: "marked".to_string()
            }
        );
    }

    #[test]
    fn test_error_fragment() {
        let fragment = error_fragment(&ParseError::MalformedSource("<bad>".into()));
        assert!(fragment.contains("Failed to parse notebook: &lt;bad&gt;"));
        assert!(fragment.contains("color:red"));
    }
}
