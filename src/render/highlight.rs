//! Syntax highlighting backed by syntect
//!
//! Finds `<code class="language-*">` blocks in a rendered region and
//! replaces their escaped text with class-annotated spans. Colours come from
//! the theme stylesheet, not from syntect themes.

use super::Highlighter;
use crate::error::{RenderError, RenderResult};
use crate::utils::html;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

fn code_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<code class="language-([A-Za-z0-9_+#.\-]+)"([^>]*)>(.*?)</code>"#)
            .expect("code block pattern is valid")
    })
}

/// Class-based syntect highlighter
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: ClassStyle::Spaced,
        }
    }

    /// Highlight plain (unescaped) code as HTML spans
    pub fn highlight_code(&self, language: &str, code: &str) -> RenderResult<String> {
        let syntax = self
            .find_syntax(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut code_with_newline = code.to_string();
        if !code_with_newline.ends_with('\n') {
            code_with_newline.push('\n');
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, self.class_style);
        for line in LinesWithEndings::from(code_with_newline.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlighting {
                    language: language.to_string(),
                    message: err.to_string(),
                })?;
        }

        let mut highlighted = generator.finalize();
        if !code.ends_with('\n') && highlighted.ends_with('\n') {
            highlighted.pop();
        }
        Ok(highlighted)
    }

    fn find_syntax(&self, token: &str) -> Option<&SyntaxReference> {
        let lowercase = token.to_ascii_lowercase();
        let token = match lowercase.as_str() {
            "ipython" | "ipython2" | "ipython3" | "python3" => "python",
            "sh" | "shell" | "zsh" => "bash",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight_region(&self, region: &str) -> String {
        code_block_pattern()
            .replace_all(region, |caps: &Captures| {
                let language = &caps[1];
                let body = &caps[3];
                // already highlighted: escaped code never contains a raw '<'
                if body.contains('<') {
                    return caps[0].to_string();
                }
                match self.highlight_code(language, &html::unescape(body)) {
                    Ok(highlighted) => format!(
                        r#"<code class="language-{} highlighted"{}>{}</code>"#,
                        language, &caps[2], highlighted
                    ),
                    Err(e) => {
                        log::warn!("{}", e);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_region() {
        let highlighter = SyntectHighlighter::new();
        let region = r#"<pre><code class="language-python">x = &quot;a&quot;
</code></pre>"#;
        let html = highlighter.highlight_region(region);
        assert!(html.contains(r#"class="language-python highlighted""#));
        assert!(html.contains("<span class=\""));
        assert!(!html.contains("&amp;quot;"));
    }

    #[test]
    fn test_highlight_keeps_attributes() {
        let highlighter = SyntectHighlighter::new();
        let region = r#"<pre><code class="language-ipython3" data-language="ipython3">print(1)</code></pre>"#;
        let html = highlighter.highlight_region(region);
        assert!(html.contains(r#"data-language="ipython3""#));
        assert!(html.contains("highlighted"));
    }

    #[test]
    fn test_highlight_is_stable() {
        let highlighter = SyntectHighlighter::new();
        let once = highlighter.highlight_region(r#"<pre><code class="language-json">{"a": 1}</code></pre>"#);
        assert_eq!(highlighter.highlight_region(&once), once);
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let highlighter = SyntectHighlighter::new();
        assert!(highlighter.highlight_code("no-such-language", "abc").is_ok());
    }

    #[test]
    fn test_plain_code_untouched() {
        let highlighter = SyntectHighlighter::new();
        let region = "<pre><code>no language</code></pre>";
        assert_eq!(highlighter.highlight_region(region), region);
    }
}
