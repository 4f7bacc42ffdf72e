#![doc = include_str!("../README.md")]

pub mod archive;
pub mod bundle;
mod convert;
pub mod document;
mod error;
pub mod math;
pub mod options;
pub mod style;
pub mod tree;
pub mod writer;

pub use error::*;

pub use crate::archive::{Archive, ArchiveImage, Contents, Encoding, ZipArchive};
pub use crate::bundle::load_bundle;
pub use crate::convert::{Conversion, DocumentConverter, Warning};
pub use crate::document::{Element, Hyperlink, Image, ImageReader, InlineImage, Paragraph, Run};
pub use crate::options::{ConvertOptions, MarkdownOptions};
pub use crate::style::{InsertionPath, PathElement, StyleMap};
pub use crate::writer::{Format, Writer, create_writer};

/// The result type for docmark.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;
