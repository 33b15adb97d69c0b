//! Serialized notebook model (nbformat 4)
//!
//! Only the fields the renderer needs are modelled; everything else in the
//! document is ignored. Unknown cell kinds deserialize to [`CellType::Other`]
//! rather than failing the whole notebook.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default language for code cells when the metadata names none
pub const DEFAULT_LANGUAGE: &str = "python";

/// A parsed notebook document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Ordered cells
    pub cells: Vec<Cell>,

    #[serde(default)]
    pub metadata: NotebookMetadata,

    #[serde(default)]
    pub nbformat: u32,

    #[serde(default)]
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Language used for code cells
    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|spec| spec.language.as_deref())
            })
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,

    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// Kind of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Markdown,
    Code,
    Raw,
    #[serde(other)]
    Other,
}

/// Text stored either as one string or as a list of lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Lines(Vec<String>),
    Text(String),
}

impl MultilineText {
    pub fn text(&self) -> String {
        match self {
            MultilineText::Lines(lines) => crate::utils::text::join_lines(lines),
            MultilineText::Text(text) => text.clone(),
        }
    }
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Text(String::new())
    }
}

/// One unit of the notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,

    #[serde(default)]
    pub source: MultilineText,

    #[serde(default)]
    pub outputs: Vec<Output>,

    #[serde(default)]
    pub execution_count: Option<u64>,
}

/// One output of a code cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub output_type: String,

    /// Stream name (`stdout` / `stderr`)
    #[serde(default)]
    pub name: Option<String>,

    /// Stream text
    #[serde(default)]
    pub text: Option<MultilineText>,

    /// Mime bundle for rich outputs
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub ename: Option<String>,

    #[serde(default)]
    pub evalue: Option<String>,

    #[serde(default)]
    pub traceback: Vec<String>,

    #[serde(default)]
    pub execution_count: Option<u64>,
}

impl Output {
    /// Text of one mime entry, joining line lists
    pub fn mime_text(&self, mime: &str) -> Option<String> {
        self.data.get(mime).map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Array(lines) => lines
                .iter()
                .map(|line| match line {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
            other => other.to_string(),
        })
    }
}
