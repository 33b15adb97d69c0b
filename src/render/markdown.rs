//! Markdown engine backed by pulldown-cmark

use super::{emoji, MarkdownEngine, MarkdownOptions};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};

/// CommonMark + GFM extensions renderer
pub struct CmarkEngine {
    options: Options,
}

impl CmarkEngine {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }
}

impl Default for CmarkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine for CmarkEngine {
    fn render(&self, markdown: &str, options: &MarkdownOptions) -> String {
        let expand_emoji = options.emoji;
        let mut in_code_block = false;

        let parser = Parser::new_ext(markdown, self.options).map(move |event| match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                Event::Start(Tag::CodeBlock(kind))
            }
            Event::End(Tag::CodeBlock(kind)) => {
                in_code_block = false;
                Event::End(Tag::CodeBlock(kind))
            }
            Event::Text(text) if expand_emoji && !in_code_block => {
                Event::Text(CowStr::from(emoji::expand(&text).into_owned()))
            }
            other => other,
        });

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        html_output
    }
}
