//! Outline (table of contents) extraction
//!
//! Scans rendered HTML for headings that carry an `id` and produces a flat,
//! ordered list of [`OutlineNode`]s. Nesting is never built as a tree: each
//! entry is wrapped in as many nesting markers as its level, and the
//! browser's box model turns the marker stream into indentation.

use crate::utils::html;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Nesting marker opened before an entry
pub const NEST_OPEN: &str = "<div class=\"_ul\">";

/// Nesting marker closed after an entry
pub const NEST_CLOSE: &str = "</div>";

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<h([1-6])(\s[^>]*)?>(.*?)</h[1-6]>").expect("heading pattern is valid")
    })
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("id pattern is valid")
    })
}

fn anchor_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<a[^>]+>|</a>").expect("anchor pattern is valid"))
}

/// One linkable heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Heading level, 1..=6
    pub level: u8,
    /// Value of the heading's `id` attribute
    pub anchor_id: String,
    /// Inner HTML of the heading with links removed
    pub title: String,
}

/// One step of the outline rendering stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineInstruction<'a> {
    Open,
    Entry(&'a OutlineNode),
    Close,
}

/// Extract every heading with an id, in document order
pub fn extract_outline(html_text: &str) -> Vec<OutlineNode> {
    heading_pattern()
        .captures_iter(html_text)
        .filter_map(|caps| {
            let attributes = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let Some(id) = id_pattern().captures(attributes).and_then(|id| {
                id.get(1)
                    .or_else(|| id.get(2))
                    .or_else(|| id.get(3))
                    .map(|m| m.as_str().to_string())
            }) else {
                log::trace!("Skipping heading without id");
                return None;
            };
            let level = caps[1].parse::<u8>().ok()?;
            Some(OutlineNode {
                level,
                anchor_id: id,
                title: anchor_tag_pattern().replace_all(&caps[3], "").into_owned(),
            })
        })
        .collect()
}

/// Expand the outline into its flat instruction stream
///
/// Each entry is preceded by `level` opens and followed by `level` closes.
/// Level jumps are not rebalanced.
pub fn instructions(outline: &[OutlineNode]) -> Vec<OutlineInstruction<'_>> {
    let mut stream = Vec::new();
    for node in outline {
        let depth = usize::from(node.level);
        stream.extend(std::iter::repeat(OutlineInstruction::Open).take(depth));
        stream.push(OutlineInstruction::Entry(node));
        stream.extend(std::iter::repeat(OutlineInstruction::Close).take(depth));
    }
    stream
}

/// Render the outline as nested-marker markup
pub fn render_outline(outline: &[OutlineNode]) -> String {
    instructions(outline)
        .into_iter()
        .fold(String::new(), |mut out, instruction| {
            match instruction {
                OutlineInstruction::Open => out.push_str(NEST_OPEN),
                OutlineInstruction::Close => out.push_str(NEST_CLOSE),
                OutlineInstruction::Entry(node) => out.push_str(&format!(
                    "<a href=\"#{}\">{}</a>",
                    html::escape(&node.anchor_id),
                    node.title
                )),
            }
            out
        })
}
