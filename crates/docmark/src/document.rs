//! The document model consumed by the converter.
//!
//! Documents are produced upstream (by a reader for the source container
//! format) and are only read during conversion.

use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use ecow::EcoString;

use crate::Result;

/// A node of the document model.
#[derive(Debug, Clone)]
pub enum Element {
    /// The document root.
    Document(Vec<Element>),
    /// A paragraph, optionally carrying a named style.
    Paragraph(Paragraph),
    /// A run of inline content sharing the same formatting.
    Run(Run),
    /// Literal text.
    Text(EcoString),
    /// A hyperlink around inline content.
    Hyperlink(Hyperlink),
    /// An embedded image.
    Image(Image),
    /// A hard line break.
    Break,
    /// A formula in MathML.
    Math(EcoString),
    /// A table, whose children are rows.
    Table(Vec<Element>),
    /// A table row, whose children are cells.
    TableRow(Vec<Element>),
    /// A table cell.
    TableCell(Vec<Element>),
}

impl Element {
    /// Creates a document root.
    pub fn document(children: Vec<Element>) -> Self {
        Element::Document(children)
    }

    /// Creates a text node.
    pub fn text(value: impl Into<EcoString>) -> Self {
        Element::Text(value.into())
    }

    /// Creates a hyperlink.
    pub fn hyperlink(href: impl Into<EcoString>, children: Vec<Element>) -> Self {
        Element::Hyperlink(Hyperlink {
            href: href.into(),
            children,
        })
    }

    /// Creates a formula node from MathML source.
    pub fn math(mathml: impl Into<EcoString>) -> Self {
        Element::Math(mathml.into())
    }

    /// The children of this node, empty for leaves.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Document(children)
            | Element::Table(children)
            | Element::TableRow(children)
            | Element::TableCell(children) => children,
            Element::Paragraph(paragraph) => &paragraph.children,
            Element::Run(run) => &run.children,
            Element::Hyperlink(link) => &link.children,
            Element::Text(_) | Element::Image(_) | Element::Break | Element::Math(_) => &[],
        }
    }
}

/// A paragraph.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// The name of the paragraph style.
    pub style_name: Option<EcoString>,
    /// The paragraph content.
    pub children: Vec<Element>,
}

impl Paragraph {
    /// An unstyled paragraph.
    pub fn new(children: Vec<Element>) -> Self {
        Self {
            style_name: None,
            children,
        }
    }

    /// Sets the paragraph style.
    pub fn styled(mut self, name: impl Into<EcoString>) -> Self {
        self.style_name = Some(name.into());
        self
    }
}

impl From<Paragraph> for Element {
    fn from(paragraph: Paragraph) -> Self {
        Element::Paragraph(paragraph)
    }
}

/// A run of formatted inline content.
#[derive(Debug, Clone, Default)]
pub struct Run {
    /// The name of the character style.
    pub style_name: Option<EcoString>,
    /// Wraps the content in `strong`.
    pub is_bold: bool,
    /// Wraps the content in `em`.
    pub is_italic: bool,
    /// Wraps the content in `ins`.
    pub is_underline: bool,
    /// The run content.
    pub children: Vec<Element>,
}

impl Run {
    /// An unstyled run without formatting.
    pub fn new(children: Vec<Element>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    /// Sets the character style.
    pub fn styled(mut self, name: impl Into<EcoString>) -> Self {
        self.style_name = Some(name.into());
        self
    }

    /// Marks the run bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Marks the run italic.
    pub fn italic(mut self) -> Self {
        self.is_italic = true;
        self
    }

    /// Marks the run underlined.
    pub fn underline(mut self) -> Self {
        self.is_underline = true;
        self
    }
}

impl From<Run> for Element {
    fn from(run: Run) -> Self {
        Element::Run(run)
    }
}

/// A hyperlink.
#[derive(Debug, Clone)]
pub struct Hyperlink {
    /// The link target.
    pub href: EcoString,
    /// The link content.
    pub children: Vec<Element>,
}

/// Reads the bytes of an embedded image.
///
/// Reads are awaited one at a time, in document order.
#[async_trait]
pub trait ImageReader: Send + Sync {
    /// Reads the image data as a base64 string.
    async fn read_base64(&self) -> Result<EcoString>;
}

/// An image whose bytes are already in memory.
#[derive(Debug, Clone)]
pub struct InlineImage(pub Bytes);

#[async_trait]
impl ImageReader for InlineImage {
    async fn read_base64(&self) -> Result<EcoString> {
        Ok(base64::engine::general_purpose::STANDARD
            .encode(&self.0)
            .into())
    }
}

/// An embedded image.
#[derive(Clone)]
pub struct Image {
    /// The MIME type of the image, e.g. `image/png`.
    pub content_type: EcoString,
    /// The alternative text.
    pub alt_text: Option<EcoString>,
    /// Reads the image bytes on demand.
    pub reader: Arc<dyn ImageReader>,
}

impl Image {
    /// An image without alternative text.
    pub fn new(content_type: impl Into<EcoString>, reader: Arc<dyn ImageReader>) -> Self {
        Self {
            content_type: content_type.into(),
            alt_text: None,
            reader,
        }
    }

    /// Sets the alternative text.
    pub fn with_alt(mut self, alt: impl Into<EcoString>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("content_type", &self.content_type)
            .field("alt_text", &self.alt_text)
            .finish_non_exhaustive()
    }
}

impl From<Image> for Element {
    fn from(image: Image) -> Self {
        Element::Image(image)
    }
}
