//! The conversion engine.
//!
//! The engine walks the document model in order and builds the intermediate
//! tree, resolving styles to insertion paths on the way. Rendering the tree
//! is left to a [`Writer`](crate::writer::Writer).

use core::fmt;

use ecow::{EcoString, eco_format};
use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, trace, warn};

use crate::document::{Element, Image, Paragraph, Run};
use crate::options::ConvertOptions;
use crate::style::lookup;
use crate::tree::{self, Attributes, Node, TreeBuilder, simplify};
use crate::writer::{Format, create_writer};
use crate::{Error, Result};

/// A non-fatal anomaly found during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// A human-readable description.
    pub message: EcoString,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The output of a conversion together with its warnings, in the order they
/// were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The rendered document.
    pub output: String,
    /// Unmapped styles and other non-fatal findings.
    pub warnings: Vec<Warning>,
}

/// Converts documents with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    options: ConvertOptions,
}

impl DocumentConverter {
    /// Creates a converter using `options`.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// The options used for every conversion.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Builds the simplified intermediate tree of a document.
    ///
    /// Fails only when an image cannot be read.
    pub async fn convert_to_tree(&self, document: &Element) -> Result<(Vec<Node>, Vec<Warning>)> {
        let mut state = ConvertState {
            options: &self.options,
            warnings: Vec::new(),
        };
        let mut html = TreeBuilder::new();
        state.element(document, &mut html).await?;
        Ok((simplify(html.finish()), state.warnings))
    }

    /// Converts a document to `format`.
    pub async fn convert(&self, document: &Element, format: Format) -> Result<Conversion> {
        debug!("converting document to {format}");
        let (nodes, warnings) = self.convert_to_tree(document).await?;

        let mut writer = create_writer(format, &self.options.markdown);
        tree::write(writer.as_mut(), &nodes);
        let output = writer.as_string();
        debug!(
            "converted document to {format}: {} bytes, {} warnings",
            output.len(),
            warnings.len()
        );
        Ok(Conversion { output, warnings })
    }

    /// Converts a document to HTML.
    pub async fn convert_to_html(&self, document: &Element) -> Result<Conversion> {
        self.convert(document, Format::Html).await
    }

    /// Converts a document to Markdown.
    pub async fn convert_to_markdown(&self, document: &Element) -> Result<Conversion> {
        self.convert(document, Format::Markdown).await
    }
}

/// State of a single conversion run.
struct ConvertState<'o> {
    options: &'o ConvertOptions,
    warnings: Vec<Warning>,
}

impl ConvertState<'_> {
    fn warn(&mut self, message: EcoString) {
        warn!("{message}");
        self.warnings.push(Warning { message });
    }

    /// Converts elements strictly one after another.
    async fn elements(&mut self, elements: &[Element], html: &mut TreeBuilder) -> Result<()> {
        for element in elements {
            self.element(element, html).await?;
        }
        Ok(())
    }

    fn element<'a>(
        &'a mut self,
        element: &'a Element,
        html: &'a mut TreeBuilder,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            match element {
                Element::Document(children) => self.elements(children, html).await?,
                Element::Paragraph(paragraph) => self.paragraph(paragraph, html).await?,
                Element::Run(run) => self.run(run, html).await?,
                Element::Text(value) => html.text(value.clone()),
                Element::Hyperlink(link) => {
                    let mut attributes = Attributes::new();
                    attributes.insert("href".into(), link.href.clone());
                    html.open("a", attributes);
                    self.elements(&link.children, html).await?;
                    html.close();
                }
                Element::Image(image) => self.image(image, html).await?,
                Element::Break => html.self_closing("br", Attributes::new()),
                Element::Math(mathml) => html.math(mathml.clone()),
                Element::Table(rows) => self.table(rows, html).await?,
                Element::TableRow(cells) => {
                    html.open("tr", Attributes::new());
                    self.elements(cells, html).await?;
                    html.close();
                }
                Element::TableCell(children) => self.cell(children, html).await?,
            }
            Ok(())
        }
        .boxed()
    }

    async fn paragraph(&mut self, paragraph: &Paragraph, html: &mut TreeBuilder) -> Result<()> {
        let options = self.options;
        let (path, warning) = lookup(
            &options.paragraph_style_map,
            "paragraph",
            paragraph.style_name.as_ref(),
        );
        if let Some(warning) = warning {
            self.warn(warning);
        }
        html.satisfy_path(path.unwrap_or(&options.default_paragraph_style));
        if paragraph.children.is_empty() && !options.ignore_empty_paragraphs {
            html.force_write();
        }
        self.elements(&paragraph.children, html).await
    }

    async fn run(&mut self, run: &Run, html: &mut TreeBuilder) -> Result<()> {
        let mut run_html = TreeBuilder::new();
        let options = self.options;
        let (path, warning) = lookup(&options.run_style_map, "run", run.style_name.as_ref());
        if let Some(warning) = warning {
            self.warn(warning);
        }
        if let Some(path) = path {
            run_html.satisfy_path(path);
        }
        if run.is_bold {
            run_html.open("strong", Attributes::new());
        }
        if run.is_italic {
            run_html.open("em", Attributes::new());
        }
        if run.is_underline {
            run_html.open("ins", Attributes::new());
        }
        self.elements(&run.children, &mut run_html).await?;
        html.append(run_html);
        Ok(())
    }

    async fn image(&mut self, image: &Image, html: &mut TreeBuilder) -> Result<()> {
        trace!("reading image ({})", image.content_type);
        let data = image
            .reader
            .read_base64()
            .await
            .map_err(|err| Error::image_read(image.content_type.clone(), err))?;

        let mut attributes = Attributes::new();
        attributes.insert(
            "src".into(),
            eco_format!("data:{};base64,{data}", image.content_type),
        );
        if let Some(alt) = image.alt_text.as_ref().filter(|alt| !alt.is_empty()) {
            attributes.insert("alt".into(), alt.clone());
        }
        html.self_closing("img", attributes);
        Ok(())
    }

    /// Tables always start at the top level and are spliced in whole.
    async fn table(&mut self, rows: &[Element], html: &mut TreeBuilder) -> Result<()> {
        html.close_all();
        let mut table_html = TreeBuilder::new();
        table_html.open("table", Attributes::new());
        self.elements(rows, &mut table_html).await?;
        html.append(table_html);
        Ok(())
    }

    /// Cell content gets its own tree so that paragraph paths cannot close
    /// the cell.
    async fn cell(&mut self, children: &[Element], html: &mut TreeBuilder) -> Result<()> {
        html.open("td", Attributes::new());
        html.force_write();
        let mut cell_html = TreeBuilder::new();
        self.elements(children, &mut cell_html).await?;
        html.append(cell_html);
        html.close();
        Ok(())
    }
}
