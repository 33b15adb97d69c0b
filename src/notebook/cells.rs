//! Cell rendering
//!
//! Turns each cell of a [`Notebook`] into its HTML block. One
//! [`CellRenderer`] lives for exactly one parse, so the heading counter
//! restarts at `h-1` for every document.

use super::model::{Cell, CellType, Notebook, Output};
use crate::render::{math, MarkdownEngine, MarkdownOptions};
use crate::utils::html;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Rich mime types in order of preference
const MIME_PREFERENCE: [&str; 8] = [
    "image/svg+xml",
    "image/png",
    "image/jpeg",
    "image/gif",
    "text/html",
    "text/markdown",
    "text/latex",
    "text/plain",
];

fn heading_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<h([1-6])(\s[^>]*)?>").expect("heading pattern is valid"))
}

fn id_attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\s+id\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("id pattern is valid")
    })
}

pub(crate) struct CellRenderer<'a> {
    engine: &'a dyn MarkdownEngine,
    options: MarkdownOptions,
    language: String,
    heading_counter: usize,
}

impl<'a> CellRenderer<'a> {
    pub(crate) fn new(engine: &'a dyn MarkdownEngine, options: MarkdownOptions, notebook: &Notebook) -> Self {
        Self {
            engine,
            options,
            language: notebook.language().to_string(),
            heading_counter: 0,
        }
    }

    /// Render every cell in source order
    pub(crate) fn render_notebook(&mut self, notebook: &Notebook) -> String {
        let mut out = String::from("<div class=\"nb-notebook\">\n");
        for cell in &notebook.cells {
            out.push_str(&self.render_cell(cell));
            out.push('\n');
        }
        out.push_str("</div>\n");
        out
    }

    fn render_cell(&mut self, cell: &Cell) -> String {
        match cell.cell_type {
            CellType::Markdown => {
                let body = self.render_markdown(&cell.source.text());
                let body = self.number_headings(&body);
                format!("<div class=\"nb-cell nb-markdown-cell\">{}</div>", body)
            }
            CellType::Code => self.render_code_cell(cell),
            CellType::Raw => Self::render_raw_cell(cell),
            CellType::Other => {
                log::debug!("Rendering unknown cell kind as raw text");
                Self::render_raw_cell(cell)
            }
        }
    }

    fn render_markdown(&self, source: &str) -> String {
        let (protected, spans) = math::protect(source);
        let rendered = self.engine.render(&protected, &self.options);
        math::restore(&rendered, &spans)
    }

    /// Assign `h-<n>` ids to every heading, replacing any id the engine set
    fn number_headings(&mut self, body: &str) -> String {
        heading_open_pattern()
            .replace_all(body, |caps: &Captures| {
                self.heading_counter += 1;
                let attributes = caps
                    .get(2)
                    .map(|m| id_attribute_pattern().replace_all(m.as_str(), "").into_owned())
                    .unwrap_or_default();
                format!(
                    "<h{} id=\"h-{}\"{}>",
                    &caps[1], self.heading_counter, attributes
                )
            })
            .into_owned()
    }

    fn render_code_cell(&self, cell: &Cell) -> String {
        let prompt = cell
            .execution_count
            .map(|n| format!(" data-prompt-number=\"{}\"", n))
            .unwrap_or_default();
        let language = html::escape(&self.language);

        let mut out = String::from("<div class=\"nb-cell nb-code-cell\">");
        out.push_str(&format!(
            "<div class=\"nb-input\"{prompt}><pre><code class=\"language-{lang}\" data-language=\"{lang}\">{code}</code></pre></div>",
            prompt = prompt,
            lang = language,
            code = html::escape(&cell.source.text()),
        ));
        for output in &cell.outputs {
            out.push_str(&format!(
                "<div class=\"nb-output\"{}>{}</div>",
                prompt,
                self.render_output(output)
            ));
        }
        out.push_str("</div>");
        out
    }

    fn render_raw_cell(cell: &Cell) -> String {
        format!(
            "<div class=\"nb-cell nb-raw-cell\"><pre>{}</pre></div>",
            html::escape(&cell.source.text())
        )
    }

    fn render_output(&self, output: &Output) -> String {
        match output.output_type.as_str() {
            "stream" => {
                let class = match output.name.as_deref() {
                    Some("stderr") => "nb-stderr",
                    _ => "nb-stdout",
                };
                let body = output.text.as_ref().map(|t| t.text()).unwrap_or_default();
                format!("<pre class=\"{}\">{}</pre>", class, html::from_ansi(&body))
            }
            "execute_result" | "display_data" | "update_display_data" => self.render_rich_output(output),
            "error" => Self::render_error_output(output),
            other => {
                log::debug!("Skipping unsupported output type {}", other);
                String::new()
            }
        }
    }

    fn render_rich_output(&self, output: &Output) -> String {
        let Some(mime) = MIME_PREFERENCE.iter().find(|m| output.data.contains_key(**m)) else {
            log::debug!("No renderable mime type in output");
            return String::new();
        };
        let body = output.mime_text(mime).unwrap_or_default();

        match *mime {
            "image/svg+xml" => format!("<div class=\"nb-svg-output\">{}</div>", body),
            "image/png" | "image/jpeg" | "image/gif" => {
                let data: String = body.chars().filter(|c| !c.is_whitespace()).collect();
                format!("<img class=\"nb-image-output\" src=\"data:{};base64,{}\">", mime, data)
            }
            "text/html" => format!("<div class=\"nb-html-output\">{}</div>", body),
            "text/markdown" => format!(
                "<div class=\"nb-markdown-output\">{}</div>",
                self.render_markdown(&body)
            ),
            "text/latex" => format!("<div class=\"nb-latex-output\">{}</div>", html::escape(&body)),
            _ => format!("<pre class=\"nb-text-output\">{}</pre>", html::from_ansi(&body)),
        }
    }

    fn render_error_output(output: &Output) -> String {
        let body = if output.traceback.is_empty() {
            format!(
                "{}: {}",
                output.ename.as_deref().unwrap_or("Error"),
                output.evalue.as_deref().unwrap_or_default()
            )
        } else {
            output.traceback.join("\n")
        };
        format!("<pre class=\"nb-error\">{}</pre>", html::from_ansi(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CmarkEngine;

    fn render(json: &str) -> String {
        let notebook: Notebook = serde_json::from_str(json).unwrap();
        let engine = CmarkEngine::new();
        CellRenderer::new(&engine, MarkdownOptions::default(), &notebook).render_notebook(&notebook)
    }

    #[test]
    fn test_cells_in_source_order() {
        let html = render(
            r##"{"cells":[
                {"cell_type":"markdown","source":"first"},
                {"cell_type":"code","source":"second","outputs":[]},
                {"cell_type":"raw","source":"third"}
            ]}"##,
        );
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        let third = html.find("third").unwrap();
        assert!(first < second && second < third);
        assert!(html.contains("nb-markdown-cell"));
        assert!(html.contains("nb-code-cell"));
        assert!(html.contains("nb-raw-cell"));
    }

    #[test]
    fn test_heading_ids_span_cells() {
        let html = render(
            r####"{"cells":[
                {"cell_type":"markdown","source":"# One\n## Two"},
                {"cell_type":"markdown","source":"### Three"}
            ]}"####,
        );
        assert!(html.contains(r#"<h1 id="h-1">One</h1>"#));
        assert!(html.contains(r#"<h2 id="h-2">Two</h2>"#));
        assert!(html.contains(r#"<h3 id="h-3">Three</h3>"#));
    }

    #[test]
    fn test_existing_heading_id_replaced() {
        let html = render(
            r##"{"cells":[{"cell_type":"markdown","source":"<h2 id=\"custom\" class=\"x\">Raw</h2>"}]}"##,
        );
        assert!(html.contains(r#"<h2 id="h-1" class="x">Raw</h2>"#));
        assert!(!html.contains("custom"));
    }

    #[test]
    fn test_code_cell_with_outputs() {
        let html = render(
            r##"{"cells":[{"cell_type":"code","execution_count":3,"source":"print('<b>')","outputs":[
                {"output_type":"stream","name":"stdout","text":["<b>\n"]},
                {"output_type":"execute_result","execution_count":3,"data":{"text/plain":"42","text/html":"<b>42</b>"}},
                {"output_type":"error","ename":"ValueError","evalue":"bad","traceback":["\u001b[0;31mValueError\u001b[0m: bad"]}
            ]}]}"##,
        );
        assert!(html.contains(r#"data-prompt-number="3""#));
        assert!(html.contains(r#"<code class="language-python" data-language="python">print(&#39;&lt;b&gt;&#39;)</code>"#));
        assert!(html.contains(r#"<pre class="nb-stdout">&lt;b&gt;"#));
        assert!(html.contains(r#"<div class="nb-html-output"><b>42</b></div>"#));
        assert!(html.contains(r#"<pre class="nb-error"><span"#));
        assert!(html.contains("ValueError</span>: bad</pre>"));
        assert!(!html.contains('\u{1b}'));
    }

    #[test]
    fn test_image_output() {
        let html = render(
            r##"{"cells":[{"cell_type":"code","source":"","outputs":[
                {"output_type":"display_data","data":{"image/png":"iVBOR\nw0KGgo=","text/plain":"<Figure>"}}
            ]}]}"##,
        );
        assert!(html.contains(r#"src="data:image/png;base64,iVBORw0KGgo=""#));
        assert!(!html.contains("&lt;Figure&gt;"));
    }

    #[test]
    fn test_math_survives_markdown() {
        let html = render(r##"{"cells":[{"cell_type":"markdown","source":"Let $a_1 * b_2 * c$ hold"}]}"##);
        assert!(html.contains("$a_1 * b_2 * c$"));
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn test_markdown_output_headings_not_numbered() {
        let html = render(
            r##"{"cells":[{"cell_type":"code","source":"","outputs":[
                {"output_type":"display_data","data":{"text/markdown":"# Result"}}
            ]}]}"##,
        );
        assert!(html.contains("<h1>Result</h1>"));
    }
}
