//! Emoji shortcode expansion
//!
//! Replaces GitHub-style `:shortcode:` markers with their unicode emoji.
//! Unknown shortcodes are left untouched.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn shortcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r":([a-z0-9_+\-]+):").expect("shortcode pattern is valid"))
}

/// Look up a single shortcode (without colons)
pub fn lookup(shortcode: &str) -> Option<&'static str> {
    emojis::get_by_shortcode(shortcode).map(|emoji| emoji.as_str())
}

/// Expand every known shortcode in `text`
pub fn expand(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }
    shortcode_pattern().replace_all(text, |caps: &Captures| match lookup(&caps[1]) {
        Some(emoji) => emoji.to_string(),
        None => caps[0].to_string(),
    })
}
