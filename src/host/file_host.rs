//! Host that writes every rendered page to a file

use super::Host;
use crate::error::FileResult;
use crate::file_handler::write_file_atomic_sync;
use crate::state::theme;
use crate::utils::html;
use crate::view::{self, ContentRegion, ContentTag, Enhancements, Page, View};
use std::path::PathBuf;

/// Writes pages atomically to `output`
#[derive(Debug, Clone)]
pub struct FileHost {
    output: PathBuf,
    assets_base: String,
    title: String,
    prefers_dark: bool,
    pages_written: usize,
}

impl FileHost {
    pub fn new(output: impl Into<PathBuf>, assets_base: impl Into<String>, prefers_dark: bool) -> Self {
        let output = output.into();
        let title = output
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "notebook".to_string());
        Self {
            output,
            assets_base: assets_base.into(),
            title,
            prefers_dark,
            pages_written: 0,
        }
    }

    pub fn set_prefers_dark(&mut self, dark: bool) {
        self.prefers_dark = dark;
    }

    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    /// Write a page whose whole content area is an error message
    pub fn present_error(&self, theme_name: &str, message: &str) -> FileResult<()> {
        let mut page = self.page();
        page.patch(&View {
            theme: theme_name.to_string(),
            appearance: theme::resolve(theme_name, &Default::default(), self.prefers_dark),
            content: ContentRegion {
                tag: ContentTag::Div,
                class: Some(view::content_class(theme_name)),
                html: format!(
                    "<div class=\"nb-source-error\" style=\"padding:20px;color:red;\">{}</div>",
                    html::escape(message)
                ),
                enhancements: Enhancements::none(),
            },
            outline: None,
        });
        page.set_content_visible(true);
        write_file_atomic_sync(&self.output, &page.to_html())
    }
}

impl Host for FileHost {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    fn present(&mut self, page: &Page) {
        match write_file_atomic_sync(&self.output, &page.to_html()) {
            Ok(()) => {
                self.pages_written += 1;
                log::debug!("Page written to {}", self.output.display());
            }
            Err(e) => log::error!("{}", e),
        }
    }

    fn page(&self) -> Page {
        Page::new(self.assets_base.clone()).with_title(self.title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NotebookViewer;
    use crate::message::{ContentOptions, InitPayload};
    use crate::render::{Capabilities, CmarkEngine};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn payload() -> InitPayload {
        InitPayload {
            theme: "github".to_string(),
            raw: r##"{"cells":[{"cell_type":"markdown","source":"# Hello"}]}"##.to_string(),
            themes: HashMap::new(),
            content: ContentOptions::default(),
            compiler: "marked".to_string(),
            raw_mode: false,
        }
    }

    #[test]
    fn test_present_writes_page() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("demo.html");
        let host = FileHost::new(&output, "assets/", false);
        let capabilities = Capabilities::empty().with_engine("marked", Arc::new(CmarkEngine::new()));

        let viewer = NotebookViewer::init(payload(), capabilities, host);
        assert_eq!(viewer.host().pages_written(), 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("<title>demo</title>"));
        assert!(written.contains(r#"href="assets/themes/github.css""#));
        assert!(written.contains(r#"<h1 id="h-1">Hello</h1>"#));
        assert!(written.contains(r#"id="_toc""#));
    }

    #[test]
    fn test_present_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("broken.html");
        let host = FileHost::new(&output, "", true);

        host.present_error("github-dark", "Notebook source unavailable: <x>").unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("Notebook source unavailable: &lt;x&gt;"));
        assert!(written.contains("_color-dark"));
        assert!(!written.contains("visibility:hidden"));
    }

    #[test]
    fn test_write_failure_is_logged_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut host = FileHost::new(dir.path().join("missing/page.html"), "", false);
        host.present(&Page::default());
        assert_eq!(host.pages_written(), 0);
    }
}
