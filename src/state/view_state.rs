//! The viewer's single mutable state
//!
//! [`ViewState`] is owned by the controller and only changed inside its
//! transition handlers. [`RenderedDocument`] is always derived from one
//! source text in a single step, so html, outline and the recorded source
//! never come from different generations.

use super::theme::{self, AppearanceClass};
use crate::message::{ContentOptions, InitPayload};
use crate::notebook::{error_fragment, NotebookParser};
use crate::outline::{extract_outline, OutlineNode};
use std::collections::HashMap;

/// Output of one parse + outline pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    /// Source text the html and outline were derived from
    pub source: String,
    /// Rendered fragment, or an error placeholder
    pub html: String,
    /// Headings of `html`, empty on failure
    pub outline: Vec<OutlineNode>,
}

impl RenderedDocument {
    /// Parse `source` and extract its outline
    ///
    /// Parse failures become an error fragment with an empty outline.
    pub fn compute(source: &str, parser: &NotebookParser) -> Self {
        match parser.parse(source) {
            Ok(parsed) => {
                let outline = extract_outline(&parsed.html);
                log::debug!(
                    "Document computed: nbformat {}.{}, {} outline entries",
                    parsed.notebook.nbformat,
                    parsed.notebook.nbformat_minor,
                    outline.len()
                );
                Self {
                    source: source.to_string(),
                    html: parsed.html,
                    outline,
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                Self {
                    source: source.to_string(),
                    html: error_fragment(&e),
                    outline: Vec::new(),
                }
            }
        }
    }
}

/// Everything the view is computed from
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Active theme name
    pub theme: String,

    /// Theme-to-appearance catalog
    pub themes: HashMap<String, String>,

    /// Show the source text instead of the rendered document
    pub raw_mode_enabled: bool,

    pub content_options: ContentOptions,

    /// Markdown engine name
    pub compiler: String,

    /// Latest document source
    pub source: String,

    pub rendered_document: RenderedDocument,

    /// `source` is newer than `rendered_document`; cleared by the next settle
    pub pending_reload: bool,
}

impl ViewState {
    /// State right after init, before the first parse
    pub fn from_payload(payload: InitPayload) -> Self {
        Self {
            theme: payload.theme,
            themes: payload.themes,
            raw_mode_enabled: payload.raw_mode,
            content_options: payload.content,
            compiler: payload.compiler,
            source: payload.raw,
            rendered_document: RenderedDocument::default(),
            pending_reload: false,
        }
    }

    /// Resolve the appearance class against the host's current preference
    pub fn appearance(&self, prefers_dark: bool) -> AppearanceClass {
        theme::resolve(&self.theme, &self.themes, prefers_dark)
    }

    /// Whether the outline should be shown once the content settles
    pub fn outline_visible(&self) -> bool {
        self.content_options.table_of_contents()
            && !self.rendered_document.outline.is_empty()
            && !self.raw_mode_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Capabilities;

    fn payload() -> InitPayload {
        InitPayload {
            theme: "custom".to_string(),
            raw: r##"{"cells":[{"cell_type":"markdown","source":"# Only"}]}"##.to_string(),
            themes: HashMap::new(),
            content: ContentOptions::default(),
            compiler: "marked".to_string(),
            raw_mode: false,
        }
    }

    #[test]
    fn test_compute_success() {
        let parser = NotebookParser::new(&Capabilities::bundled(), "marked", &ContentOptions::default());
        let doc = RenderedDocument::compute(&payload().raw, &parser);
        assert_eq!(doc.source, payload().raw);
        assert_eq!(doc.outline.len(), 1);
        assert_eq!(doc.outline[0].anchor_id, "h-1");
    }

    #[test]
    fn test_compute_failure_is_placeholder() {
        let parser = NotebookParser::new(&Capabilities::bundled(), "marked", &ContentOptions::default());
        let doc = RenderedDocument::compute("{oops", &parser);
        assert!(doc.html.contains("Failed to parse notebook"));
        assert!(doc.outline.is_empty());
        assert_eq!(doc.source, "{oops");
    }

    #[test]
    fn test_outline_visibility() {
        let parser = NotebookParser::new(&Capabilities::bundled(), "marked", &ContentOptions::default());
        let mut state = ViewState::from_payload(payload());
        assert!(!state.outline_visible());

        state.rendered_document = RenderedDocument::compute(&state.source, &parser);
        assert!(state.outline_visible());

        state.raw_mode_enabled = true;
        assert!(!state.outline_visible());

        state.raw_mode_enabled = false;
        state.content_options.toc = false;
        assert!(!state.outline_visible());
    }

    #[test]
    fn test_appearance_follows_preference() {
        let state = ViewState::from_payload(payload());
        assert_eq!(state.appearance(true), AppearanceClass::Dark);
        assert_eq!(state.appearance(false), AppearanceClass::Light);
    }
}
