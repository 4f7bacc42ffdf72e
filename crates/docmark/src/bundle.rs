//! Documents stored as bundles.
//!
//! A bundle is a zip archive with the document model in `document.json`
//! and the image data in further entries:
//!
//! ```json
//! {
//!   "type": "document",
//!   "children": [
//!     { "type": "paragraph", "styleName": "Heading1", "children": [
//!       { "type": "run", "isBold": true, "children": [{ "type": "text", "value": "Hi" }] }
//!     ] },
//!     { "type": "image", "contentType": "image/png", "path": "media/a.png" }
//!   ]
//! }
//! ```

use std::sync::Arc;

use ecow::EcoString;
use log::{debug, warn};
use serde::Deserialize;

use crate::Result;
use crate::archive::{Archive, ArchiveImage, Encoding};
use crate::document::{Element, Image, Paragraph, Run};

/// The entry holding the document model.
pub const DOCUMENT_ENTRY: &str = "document.json";

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum ElementSpec {
    Document {
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    Paragraph {
        #[serde(default)]
        style_name: Option<EcoString>,
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    Run {
        #[serde(default)]
        style_name: Option<EcoString>,
        #[serde(default)]
        is_bold: bool,
        #[serde(default)]
        is_italic: bool,
        #[serde(default)]
        is_underline: bool,
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    Text {
        value: EcoString,
    },
    Hyperlink {
        #[serde(default)]
        href: EcoString,
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    Image {
        content_type: EcoString,
        #[serde(default)]
        alt_text: Option<EcoString>,
        path: EcoString,
    },
    Break,
    Math {
        mathml: EcoString,
    },
    Table {
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    TableRow {
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
    TableCell {
        #[serde(default)]
        children: Vec<ElementSpec>,
    },
}

/// Loads the document of a bundle.
///
/// Images are not read here; each image reads its entry when it is
/// converted.
pub async fn load_bundle(archive: Arc<dyn Archive>) -> Result<Element> {
    let source = archive
        .read(DOCUMENT_ENTRY, Some(Encoding::Utf8))
        .await?
        .into_text();
    let spec: ElementSpec = serde_json::from_str(&source)?;
    debug!("loaded bundle document");
    Ok(into_element(spec, &archive))
}

fn into_elements(specs: Vec<ElementSpec>, archive: &Arc<dyn Archive>) -> Vec<Element> {
    specs
        .into_iter()
        .map(|spec| into_element(spec, archive))
        .collect()
}

fn into_element(spec: ElementSpec, archive: &Arc<dyn Archive>) -> Element {
    match spec {
        ElementSpec::Document { children } => Element::document(into_elements(children, archive)),
        ElementSpec::Paragraph {
            style_name,
            children,
        } => Paragraph {
            style_name,
            children: into_elements(children, archive),
        }
        .into(),
        ElementSpec::Run {
            style_name,
            is_bold,
            is_italic,
            is_underline,
            children,
        } => Run {
            style_name,
            is_bold,
            is_italic,
            is_underline,
            children: into_elements(children, archive),
        }
        .into(),
        ElementSpec::Text { value } => Element::Text(value),
        ElementSpec::Hyperlink { href, children } => {
            Element::hyperlink(href, into_elements(children, archive))
        }
        ElementSpec::Image {
            content_type,
            alt_text,
            path,
        } => {
            if !archive.exists(&path) {
                warn!("image entry {path} is missing from the bundle");
            }
            Image {
                content_type,
                alt_text,
                reader: Arc::new(ArchiveImage::new(archive.clone(), path)),
            }
            .into()
        }
        ElementSpec::Break => Element::Break,
        ElementSpec::Math { mathml } => Element::Math(mathml),
        ElementSpec::Table { children } => Element::Table(into_elements(children, archive)),
        ElementSpec::TableRow { children } => Element::TableRow(into_elements(children, archive)),
        ElementSpec::TableCell { children } => {
            Element::TableCell(into_elements(children, archive))
        }
    }
}
