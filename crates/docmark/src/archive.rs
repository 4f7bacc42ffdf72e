//! Access to the zip container a document and its images live in.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use ecow::EcoString;
use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::RwLock;
use zip::write::SimpleFileOptions;

use crate::document::ImageReader;
use crate::{Error, Result};

/// How to decode an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Text decoded as UTF-8.
    Utf8,
    /// Bytes encoded as base64 text.
    Base64,
}

/// The contents of an archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// Raw bytes, when no encoding was requested.
    Bytes(Bytes),
    /// Decoded text.
    Text(EcoString),
}

impl Contents {
    /// The contents as text. Raw bytes are decoded lossily.
    pub fn into_text(self) -> EcoString {
        match self {
            Contents::Text(text) => text,
            Contents::Bytes(bytes) => String::from_utf8_lossy(&bytes).into(),
        }
    }

    /// The contents as bytes.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Contents::Bytes(bytes) => bytes,
            Contents::Text(text) => Bytes::from(text.as_bytes().to_vec()),
        }
    }
}

/// A container of named entries.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Whether an entry exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Reads an entry, decoding it when `encoding` is given.
    async fn read(&self, path: &str, encoding: Option<Encoding>) -> Result<Contents>;

    /// Adds an entry or replaces an existing one.
    async fn write(&self, path: &str, contents: Bytes) -> Result<()>;

    /// Serializes the archive.
    async fn to_bytes(&self) -> Result<Bytes>;
}

/// A zip archive held in memory.
#[derive(Debug, Default)]
pub struct ZipArchive {
    entries: RwLock<IndexMap<EcoString, Bytes>>,
}

impl ZipArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every entry of a zip file.
    pub fn open(data: impl Into<Bytes>) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(data.into()))?;
        let mut entries = IndexMap::with_capacity(zip.len());
        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.insert(EcoString::from(file.name()), Bytes::from(data));
        }
        debug!("opened archive with {} entries", entries.len());
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Reads a zip file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(std::fs::read(path)?)
    }

    /// Names of all entries, in archive order.
    pub fn entry_names(&self) -> Vec<EcoString> {
        self.entries.read().keys().cloned().collect()
    }

    fn entry(&self, path: &str) -> Result<Bytes> {
        self.entries
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::missing_entry(path))
    }
}

#[async_trait]
impl Archive for ZipArchive {
    fn exists(&self, path: &str) -> bool {
        self.entries.read().contains_key(path)
    }

    async fn read(&self, path: &str, encoding: Option<Encoding>) -> Result<Contents> {
        let data = self.entry(path)?;
        Ok(match encoding {
            None => Contents::Bytes(data),
            Some(Encoding::Base64) => {
                Contents::Text(base64::engine::general_purpose::STANDARD.encode(&data).into())
            }
            Some(Encoding::Utf8) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|err| format!("entry {path} is not valid UTF-8: {err}"))?;
                Contents::Text(text.into())
            }
        })
    }

    async fn write(&self, path: &str, contents: Bytes) -> Result<()> {
        self.entries.write().insert(path.into(), contents);
        Ok(())
    }

    async fn to_bytes(&self) -> Result<Bytes> {
        let entries = self.entries.read().clone();
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in &entries {
            zip.start_file(name.to_string(), options)?;
            zip.write_all(data)?;
        }
        Ok(Bytes::from(zip.finish()?.into_inner()))
    }
}

/// An image stored as an archive entry.
pub struct ArchiveImage {
    archive: Arc<dyn Archive>,
    path: EcoString,
}

impl ArchiveImage {
    /// Reads the image from `path` in `archive`.
    pub fn new(archive: Arc<dyn Archive>, path: impl Into<EcoString>) -> Self {
        Self {
            archive,
            path: path.into(),
        }
    }
}

#[async_trait]
impl ImageReader for ArchiveImage {
    async fn read_base64(&self) -> Result<EcoString> {
        trace!("reading image {}", self.path);
        let contents = self.archive.read(&self.path, Some(Encoding::Base64)).await?;
        Ok(contents.into_text())
    }
}

/// Splits a path into its directory and its last component.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

/// Joins path components with `/`.
///
/// Empty components are skipped and an absolute component discards
/// everything before it.
pub fn join_path(components: &[&str]) -> String {
    let mut relevant: Vec<&str> = Vec::new();
    for component in components.iter().filter(|c| !c.is_empty()) {
        if component.starts_with('/') {
            relevant.clear();
        }
        relevant.push(component);
    }
    relevant.join("/")
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    fn sample() -> Bytes {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("word/", options).unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        zip.start_file("word/media/image1.png", options).unwrap();
        zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        Bytes::from(zip.finish().unwrap().into_inner())
    }

    #[test]
    fn reads_entries() {
        let archive = ZipArchive::open(sample()).unwrap();
        assert_eq!(
            archive.entry_names(),
            ["word/document.xml", "word/media/image1.png"]
        );
        assert!(archive.exists("word/document.xml"));
        assert!(!archive.exists("word/missing.xml"));

        let text = block_on(archive.read("word/document.xml", Some(Encoding::Utf8))).unwrap();
        assert_eq!(text, Contents::Text("<w:document/>".into()));

        let raw = block_on(archive.read("word/media/image1.png", None)).unwrap();
        assert_eq!(raw.into_bytes().as_ref(), &[0x89, b'P', b'N', b'G']);

        let encoded = block_on(archive.read("word/media/image1.png", Some(Encoding::Base64)));
        assert_eq!(encoded.unwrap().into_text(), "iVBORw==");
    }

    #[test]
    fn missing_entry_is_an_error() {
        let archive = ZipArchive::new();
        let err = block_on(archive.read("nope", None)).unwrap_err();
        assert_eq!(err.to_string(), "archive entry not found: nope");
    }

    #[test]
    fn written_entries_survive_serialization() {
        let archive = ZipArchive::open(sample()).unwrap();
        block_on(archive.write("word/document.xml", Bytes::from_static(b"<new/>"))).unwrap();
        block_on(archive.write("extra.txt", Bytes::from_static(b"hi"))).unwrap();

        let reopened = ZipArchive::open(block_on(archive.to_bytes()).unwrap()).unwrap();
        let text = block_on(reopened.read("word/document.xml", Some(Encoding::Utf8))).unwrap();
        assert_eq!(text.into_text(), "<new/>");
        assert!(reopened.exists("extra.txt"));
    }

    #[test]
    fn archive_image_reads_base64() {
        let archive: Arc<dyn Archive> = Arc::new(ZipArchive::open(sample()).unwrap());
        let image = ArchiveImage::new(archive.clone(), "word/media/image1.png");
        assert_eq!(block_on(image.read_base64()).unwrap(), "iVBORw==");

        let missing = ArchiveImage::new(archive, "word/media/image2.png");
        assert!(block_on(missing.read_base64()).is_err());
    }

    #[test]
    fn splits_paths() {
        assert_eq!(split_path("word/media/a.png"), ("word/media", "a.png"));
        assert_eq!(split_path("a.png"), ("", "a.png"));
        assert_eq!(split_path("/a.png"), ("", "a.png"));
    }

    #[test]
    fn joins_paths() {
        assert_eq!(join_path(&["word", "media", "a.png"]), "word/media/a.png");
        assert_eq!(join_path(&["word", "", "a.png"]), "word/a.png");
        assert_eq!(join_path(&["word", "/media", "a.png"]), "/media/a.png");
        assert_eq!(join_path(&[]), "");
    }
}
