//! Writer implementations for different output formats

pub mod html;
pub mod markdown;

pub use html::HtmlWriter;
pub use markdown::MarkdownWriter;

use core::fmt;
use std::str::FromStr;

use crate::options::MarkdownOptions;
use crate::tree::Attributes;
use crate::Error;

/// A sink turning tree events into markup.
///
/// The dispatcher in [`crate::tree::write`] drives every writer the same
/// way; all format-specific behavior lives in the implementations.
pub trait Writer {
    /// Starts a non-void element.
    fn open(&mut self, tag: &str, attributes: &Attributes);
    /// Ends the most recently started element.
    fn close(&mut self, tag: &str);
    /// Writes a void element.
    fn self_closing(&mut self, tag: &str, attributes: &Attributes);
    /// Writes literal text. Escaping is up to the writer.
    fn text(&mut self, value: &str);
    /// Writes a MathML formula.
    fn mathml(&mut self, value: &str);
    /// The output written so far.
    fn as_string(&self) -> String;
}

/// Valid formats for the conversion.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// HTML markup.
    #[default]
    Html,
    /// Markdown with pandoc-style underline spans and TeX math.
    Markdown,
}

impl Format {
    /// The conventional file extension of the format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Markdown => "md",
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Format::Html),
            "md" | "markdown" => Ok(Format::Markdown),
            _ => Err(format!("unknown output format: {s}").into()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Html => "html",
            Format::Markdown => "markdown",
        })
    }
}

/// Create a writer instance based on the specified format
pub fn create_writer(format: Format, options: &MarkdownOptions) -> Box<dyn Writer> {
    match format {
        Format::Html => Box::new(HtmlWriter::new()),
        Format::Markdown => Box::new(MarkdownWriter::with_options(options.clone())),
    }
}
