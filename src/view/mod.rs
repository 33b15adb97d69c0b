//! Declarative view of the viewer state
//!
//! [`view`] is a pure function of the [`ViewState`] and the host's current
//! colour-scheme preference. The controller patches its result into a
//! [`Page`].

pub mod page;

pub use page::Page;

use crate::outline::render_outline;
use crate::state::{theme, AppearanceClass, ViewState};
use crate::utils::html;

/// Class added to every content container
pub const VIEWER_CLASS: &str = "notebook-viewer";

/// Element kind of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTag {
    Div,
    Pre,
}

impl ContentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTag::Div => "div",
            ContentTag::Pre => "pre",
        }
    }
}

/// Post-render passes a content region asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enhancements {
    pub highlight: bool,
    pub math: bool,
}

impl Enhancements {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Desired content container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRegion {
    pub tag: ContentTag,
    pub class: Option<String>,
    pub html: String,
    pub enhancements: Enhancements,
}

/// Everything one render puts on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub theme: String,
    pub appearance: AppearanceClass,
    pub content: ContentRegion,
    /// Outline markup, present only with `toc` on and a non-empty outline
    pub outline: Option<String>,
}

/// Content container class for a theme
pub fn content_class(theme_name: &str) -> String {
    let base = if theme::uses_github_markup(theme_name) {
        "markdown-body"
    } else {
        "markdown-theme"
    };
    format!("{} {}", base, VIEWER_CLASS)
}

/// Compute the view for the current state
pub fn view(state: &ViewState, prefers_dark: bool) -> View {
    let document = &state.rendered_document;
    let options = state.content_options;

    // raw source is shown verbatim: never typeset, highlighted only as one json block
    let content = if state.raw_mode_enabled {
        let source = html::escape(&document.source);
        if options.syntax_highlighting() {
            ContentRegion {
                tag: ContentTag::Div,
                class: Some(content_class(&state.theme)),
                html: format!(
                    "<pre class=\"language-json\"><code class=\"language-json\">{}</code></pre>",
                    source
                ),
                enhancements: Enhancements {
                    highlight: true,
                    math: false,
                },
            }
        } else {
            ContentRegion {
                tag: ContentTag::Pre,
                class: None,
                html: source,
                enhancements: Enhancements::none(),
            }
        }
    } else {
        ContentRegion {
            tag: ContentTag::Div,
            class: Some(content_class(&state.theme)),
            html: document.html.clone(),
            enhancements: Enhancements {
                highlight: options.syntax_highlighting(),
                math: options.math_rendering(),
            },
        }
    };

    let outline = (state.content_options.table_of_contents() && !document.outline.is_empty())
        .then(|| render_outline(&document.outline));

    View {
        theme: state.theme.clone(),
        appearance: state.appearance(prefers_dark),
        content,
        outline,
    }
}
