//! Page model a view is patched into
//!
//! The page keeps the html each region was created from and the passes it
//! was enhanced with, so a patch can tell whether a region was actually
//! replaced or only had its attributes updated. Enhanced html (highlighted,
//! typeset) replaces a region's body without changing its source.

use super::{ContentRegion, ContentTag, Enhancements, View};
use crate::utils::html;

/// Id of the theme stylesheet link
pub const THEME_LINK_ID: &str = "_theme";
/// Id of the KaTeX stylesheet link
pub const MATH_STYLESHEET_ID: &str = "_katex";
/// KaTeX stylesheet, relative to the assets base
pub const MATH_STYLESHEET: &str = "katex/katex.min.css";
/// Id of the content container
pub const CONTENT_ID: &str = "_markdown";
/// Id of the outline toggle button
pub const OUTLINE_TOGGLE_ID: &str = "_toc-toggle";
/// Id of the outline container
pub const OUTLINE_ID: &str = "_toc";
/// Class keeping math typesetting away from the outline
pub const OUTLINE_CLASS: &str = "tex2jax-ignore";

/// One replaceable element of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    tag: ContentTag,
    class: Option<String>,
    source_html: String,
    html: String,
    enhancements: Enhancements,
    visible: bool,
}

impl Region {
    fn new(tag: ContentTag, class: Option<String>, source_html: String, enhancements: Enhancements) -> Self {
        Self {
            tag,
            class,
            html: source_html.clone(),
            source_html,
            enhancements,
            visible: false,
        }
    }

    /// Current body, including enhancements
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Passes to run over a freshly created body
    pub fn enhancements(&self) -> Enhancements {
        self.enhancements
    }

    #[cfg(test)]
    pub fn tag(&self) -> ContentTag {
        self.tag
    }

    #[cfg(test)]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn to_html(&self, id: &str) -> String {
        let class = self
            .class
            .as_ref()
            .map(|c| format!(" class=\"{}\"", html::escape(c)))
            .unwrap_or_default();
        let style = if self.visible { "" } else { " style=\"visibility:hidden\"" };
        let tag = self.tag.as_str();
        format!("<{tag} id=\"{id}\"{class}{style}>{body}</{tag}>", body = self.html)
    }
}

/// What a patch changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The content region was created or its body replaced
    pub content_replaced: bool,
    /// The outline region was created, replaced or removed
    pub outline_replaced: bool,
}

/// The page granted by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    assets_base: String,
    title: String,
    theme_href: Option<String>,
    body_classes: Vec<String>,
    content: Option<Region>,
    outline: Option<Region>,
}

impl Page {
    /// Empty page; theme stylesheets resolve under `assets_base`
    pub fn new(assets_base: impl Into<String>) -> Self {
        Self {
            assets_base: assets_base.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Apply a view, touching only what differs
    pub fn patch(&mut self, view: &View) -> PatchOutcome {
        self.theme_href = Some(format!("{}themes/{}.css", self.assets_base, view.theme));

        self.body_classes
            .retain(|name| !name.starts_with("_theme") && !name.starts_with("_color"));
        self.body_classes.push(format!("_theme-{}", view.theme));
        self.body_classes
            .push(format!("_color-{}", view.appearance.as_str()));

        PatchOutcome {
            content_replaced: self.patch_content(&view.content),
            outline_replaced: self.patch_outline(view.outline.as_deref()),
        }
    }

    fn patch_content(&mut self, content: &ContentRegion) -> bool {
        if let Some(region) = self
            .content
            .as_mut()
            .filter(|region| {
                region.tag == content.tag
                    && region.source_html == content.html
                    && region.enhancements == content.enhancements
            })
        {
            region.class = content.class.clone();
            return false;
        }
        self.content = Some(Region::new(
            content.tag,
            content.class.clone(),
            content.html.clone(),
            content.enhancements,
        ));
        true
    }

    fn patch_outline(&mut self, outline: Option<&str>) -> bool {
        let unchanged = match (&self.outline, outline) {
            (Some(region), Some(markup)) => region.source_html == markup,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }
        self.outline = outline.map(|markup| {
            Region::new(
                ContentTag::Div,
                Some(OUTLINE_CLASS.to_string()),
                markup.to_string(),
                Enhancements::none(),
            )
        });
        true
    }

    #[cfg(test)]
    pub fn theme_href(&self) -> Option<&str> {
        self.theme_href.as_deref()
    }

    #[cfg(test)]
    pub fn body_classes(&self) -> &[String] {
        &self.body_classes
    }

    #[cfg(test)]
    pub fn has_body_class(&self, name: &str) -> bool {
        self.body_classes.iter().any(|c| c == name)
    }

    pub fn content(&self) -> Option<&Region> {
        self.content.as_ref()
    }

    #[cfg(test)]
    pub fn outline(&self) -> Option<&Region> {
        self.outline.as_ref()
    }

    /// The toggle exists exactly when the outline container does
    #[cfg(test)]
    pub fn has_outline_toggle(&self) -> bool {
        self.outline.is_some()
    }

    /// Replace the content body with an enhanced version of itself
    pub fn set_content_html(&mut self, enhanced: String) {
        if let Some(region) = &mut self.content {
            region.html = enhanced;
        }
    }

    pub fn set_content_visible(&mut self, visible: bool) {
        if let Some(region) = &mut self.content {
            region.visible = visible;
        }
    }

    pub fn set_outline_visible(&mut self, visible: bool) {
        if let Some(region) = &mut self.outline {
            region.visible = visible;
        }
    }

    /// Serialize to a complete HTML document
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", html::escape(&self.title)));
        if let Some(href) = &self.theme_href {
            out.push_str(&format!(
                "<link id=\"{}\" rel=\"stylesheet\" type=\"text/css\" href=\"{}\">\n",
                THEME_LINK_ID,
                html::escape(href)
            ));
        }
        if self.content.as_ref().is_some_and(|content| content.enhancements.math) {
            out.push_str(&format!(
                "<link id=\"{}\" rel=\"stylesheet\" type=\"text/css\" href=\"{}\">\n",
                MATH_STYLESHEET_ID,
                html::escape(&format!("{}{}", self.assets_base, MATH_STYLESHEET))
            ));
        }
        out.push_str("</head>\n");
        out.push_str(&format!(
            "<body class=\"{}\">\n",
            html::escape(&self.body_classes.join(" "))
        ));

        if let Some(content) = &self.content {
            out.push_str(&content.to_html(CONTENT_ID));
            out.push('\n');
        }
        if let Some(outline) = &self.outline {
            out.push_str(&format!(
                "<div id=\"{}\" title=\"Toggle Table of Contents\" onclick=\"document.body.classList.toggle('_toc-visible')\">&#9776;</div>\n",
                OUTLINE_TOGGLE_ID
            ));
            out.push_str(&outline.to_html(OUTLINE_ID));
            out.push('\n');
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}
