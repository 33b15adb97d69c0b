//! Utilities module for nbview
//!
//! Shared helper functions:
//! - HTML escaping and ANSI-to-HTML conversion
//! - Text utilities

/// HTML utilities
pub mod html {
    /// Escape text for use inside element content or attribute values
    pub fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Reverse [`escape`] plus the common numeric forms emitted by markdown engines
    pub fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&#x27;", "'")
            .replace("&amp;", "&")
    }

    /// Terminal output as HTML, ANSI colours kept as styled spans
    pub fn from_ansi(text: &str) -> String {
        match ansi_to_html::convert(text) {
            Ok(converted) => converted,
            Err(e) => {
                log::debug!("ANSI conversion failed, dropping colours: {}", e);
                escape(&super::text::strip_ansi(text))
            }
        }
    }
}

/// Text utilities
pub mod text {
    use regex::Regex;
    use std::sync::OnceLock;

    fn ansi_escape() -> &'static Regex {
        static ANSI: OnceLock<Regex> = OnceLock::new();
        ANSI.get_or_init(|| {
            Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07")
                .expect("ANSI pattern is valid")
        })
    }

    /// Join a notebook multi-line field (string or list of strings)
    pub fn join_lines(lines: &[String]) -> String {
        lines.concat()
    }

    /// Remove ANSI colour/control sequences from terminal output
    pub fn strip_ansi(text: &str) -> String {
        ansi_escape().replace_all(text, "").into_owned()
    }

    /// Truncate string with ellipsis
    pub fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else if max_chars <= 3 {
            "...".to_string()
        } else {
            let head: String = s.chars().take(max_chars - 3).collect();
            format!("{}...", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = r#"<a href="x">Tom & 'Jerry'</a>"#;
        let escaped = html::escape(raw);
        assert_eq!(
            escaped,
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(html::unescape(&escaped), raw);
    }

    #[test]
    fn test_unescape_does_not_double_decode() {
        assert_eq!(html::unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_from_ansi_keeps_colour() {
        let colored = "\u{1b}[0;31mZeroDivisionError\u{1b}[0m: division <by> zero";
        let converted = html::from_ansi(colored);
        assert!(converted.contains("<span"));
        assert!(converted.contains("ZeroDivisionError"));
        assert!(converted.contains(": division &lt;by&gt; zero"));
        assert!(!converted.contains('\u{1b}'));
    }

    #[test]
    fn test_from_ansi_plain_text_is_escaped() {
        assert_eq!(html::from_ansi("a < b"), "a &lt; b");
    }

    #[test]
    fn test_strip_ansi() {
        let colored = "\u{1b}[0;31mZeroDivisionError\u{1b}[0m: division by zero";
        assert_eq!(text::strip_ansi(colored), "ZeroDivisionError: division by zero");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(text::truncate("hello", 10), "hello");
        assert_eq!(text::truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_join_lines() {
        let lines = vec!["a\n".to_string(), "b".to_string()];
        assert_eq!(text::join_lines(&lines), "a\nb");
    }
}
