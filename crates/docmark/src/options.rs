//! Conversion options.
//!
//! Options can be built in code or loaded from a TOML style map:
//!
//! ```toml
//! default_paragraph = "p:fresh"
//! ignore_empty_paragraphs = true
//!
//! [paragraph]
//! Heading1 = "h1:fresh"
//! ListBullet = "ul > li:fresh"
//!
//! [run]
//! Strong = "strong"
//!
//! [markdown]
//! emphasis = "*"
//! ```

use std::path::Path;

use ecow::EcoString;
use serde::Deserialize;

use crate::Result;
use crate::style::{InsertionPath, StyleMap};

/// Options of a [`crate::DocumentConverter`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// The path used for paragraphs without a mapped style.
    #[serde(rename = "default_paragraph")]
    pub default_paragraph_style: InsertionPath,
    /// Paragraph style names to insertion paths.
    #[serde(rename = "paragraph")]
    pub paragraph_style_map: StyleMap,
    /// Run style names to insertion paths.
    #[serde(rename = "run")]
    pub run_style_map: StyleMap,
    /// Drop paragraphs without content instead of writing empty elements.
    pub ignore_empty_paragraphs: bool,
    /// Options of the Markdown writer.
    pub markdown: MarkdownOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            default_paragraph_style: InsertionPath::top_level("p"),
            paragraph_style_map: StyleMap::new(),
            run_style_map: StyleMap::new(),
            ignore_empty_paragraphs: true,
            markdown: MarkdownOptions::default(),
        }
    }
}

impl ConvertOptions {
    /// The default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a TOML style map.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Loads options from a TOML style map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Maps a paragraph style.
    pub fn with_paragraph_style(
        mut self,
        name: impl Into<EcoString>,
        path: InsertionPath,
    ) -> Self {
        self.paragraph_style_map.insert(name.into(), path);
        self
    }

    /// Maps a run style.
    pub fn with_run_style(mut self, name: impl Into<EcoString>, path: InsertionPath) -> Self {
        self.run_style_map.insert(name.into(), path);
        self
    }

    /// Replaces the path for unstyled paragraphs.
    pub fn with_default_paragraph_style(mut self, path: InsertionPath) -> Self {
        self.default_paragraph_style = path;
        self
    }

    /// Whether paragraphs without content are dropped.
    pub fn with_ignore_empty_paragraphs(mut self, ignore: bool) -> Self {
        self.ignore_empty_paragraphs = ignore;
        self
    }

    /// Replaces the Markdown writer options.
    pub fn with_markdown(mut self, markdown: MarkdownOptions) -> Self {
        self.markdown = markdown;
        self
    }
}

/// Options of the Markdown writer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Delimiter for italic text, `_` or `*`.
    pub emphasis: char,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { emphasis: '_' }
    }
}

impl MarkdownOptions {
    pub(crate) fn emphasis_delimiter(&self) -> &'static str {
        match self.emphasis {
            '*' => "*",
            _ => "_",
        }
    }
}
