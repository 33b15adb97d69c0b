//! Math handling
//!
//! Two halves:
//! - [`protect`] / [`restore`] shield TeX spans in markdown prose from the
//!   markdown engine, so `_` and `*` inside formulas survive untouched.
//! - [`KatexMathEngine`] finds the delimiters in a rendered region and
//!   typesets each formula with KaTeX. Formulas KaTeX rejects stay as written.

use super::MathEngine;
use crate::error::{RenderError, RenderResult};
use crate::utils::html;
use katex::{OptsBuilder, OutputType};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const ENVIRONMENTS: &str = "equation|align|alignat|gather|multline";

/// Display delimiters first so `$$` never parses as two inline spans.
fn math_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(
            r"(?s)\$\$(?P<dd>.+?)\$\$|\\\[(?P<db>.+?)\\\]|\\begin\{{(?:{env})\*?\}}(?P<env>.+?)\\end\{{(?:{env})\*?\}}|\\\((?P<ip>.+?)\\\)|\$(?P<id>[^$\n]+?)\$",
            env = ENVIRONMENTS
        );
        Regex::new(&pattern).expect("math pattern is valid")
    })
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@@(\d+)@@").expect("placeholder pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"))
}

fn verbatim_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(pre|code|script|style|textarea)\b.*?</(?:pre|code|script|style|textarea)>")
            .expect("verbatim pattern is valid")
    })
}

/// Replace every math span with an `@@n@@` placeholder
pub fn protect(markdown: &str) -> (String, Vec<String>) {
    let mut spans = Vec::new();
    let protected = math_pattern().replace_all(markdown, |caps: &Captures| {
        spans.push(caps[0].to_string());
        format!("@@{}@@", spans.len() - 1)
    });
    (protected.into_owned(), spans)
}

/// Put the original spans back (HTML-escaped) in place of their placeholders
pub fn restore(html_text: &str, spans: &[String]) -> String {
    if spans.is_empty() {
        return html_text.to_string();
    }
    placeholder_pattern()
        .replace_all(html_text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| spans.get(index))
                .map(|span| html::escape(span))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Typeset one formula to KaTeX HTML
pub fn render_math_html(tex: &str, display_mode: bool) -> RenderResult<String> {
    let mut builder = OptsBuilder::default();
    builder.display_mode(display_mode);
    builder.output_type(OutputType::Html);

    let opts = builder.build().map_err(|err| RenderError::Typesetting {
        tex: tex.to_string(),
        message: format!("failed to build KaTeX options: {err}"),
    })?;

    katex::render_with_opts(tex, opts).map_err(|err| RenderError::Typesetting {
        tex: tex.to_string(),
        message: err.to_string(),
    })
}

/// Typesets delimited TeX in a region with KaTeX
#[derive(Debug, Default)]
pub struct KatexMathEngine;

impl KatexMathEngine {
    pub fn new() -> Self {
        Self
    }

    fn typeset_text(text: &str) -> String {
        math_pattern()
            .replace_all(text, |caps: &Captures| {
                let (tex, display) = if caps.name("env").is_some() {
                    (caps[0].trim(), true)
                } else if let Some(tex) = caps.name("dd").or_else(|| caps.name("db")) {
                    (tex.as_str().trim(), true)
                } else {
                    let tex = caps
                        .name("ip")
                        .or_else(|| caps.name("id"))
                        .map(|m| m.as_str())
                        .unwrap_or_default();
                    (tex.trim(), false)
                };

                // region text is escaped html, KaTeX wants the TeX itself
                match render_math_html(&html::unescape(tex), display) {
                    Ok(rendered) if display => {
                        format!(r#"<div class="math math-display">{}</div>"#, rendered)
                    }
                    Ok(rendered) => format!(r#"<span class="math math-inline">{}</span>"#, rendered),
                    Err(e) => {
                        log::warn!("{}", e);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Typeset the text runs between tags of a non-verbatim stretch of HTML
    fn typeset_markup(markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut last = 0;
        for tag in tag_pattern().find_iter(markup) {
            out.push_str(&Self::typeset_text(&markup[last..tag.start()]));
            out.push_str(tag.as_str());
            last = tag.end();
        }
        out.push_str(&Self::typeset_text(&markup[last..]));
        out
    }
}

impl MathEngine for KatexMathEngine {
    fn typeset_region(&self, region: &str) -> String {
        let mut out = String::with_capacity(region.len());
        let mut last = 0;
        for verbatim in verbatim_pattern().find_iter(region) {
            out.push_str(&Self::typeset_markup(&region[last..verbatim.start()]));
            out.push_str(verbatim.as_str());
            last = verbatim.end();
        }
        out.push_str(&Self::typeset_markup(&region[last..]));
        out
    }
}
