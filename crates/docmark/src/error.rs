use core::fmt;
use std::{borrow::Cow, ops::Deref};

use ecow::EcoString;

/// An error that can occur during the conversion process.
pub struct Error(Box<Repr>);

enum Repr {
    /// Just a message.
    Msg(Cow<'static, str>),
    /// The bytes of an embedded image could not be read.
    ImageRead {
        content_type: EcoString,
        source: Error,
    },
    /// An archive entry is missing.
    MissingEntry(EcoString),
    /// An insertion path could not be parsed.
    InvalidPath {
        input: EcoString,
        reason: Cow<'static, str>,
    },
    /// An underlying I/O error.
    Io(std::io::Error),
}

impl Error {
    /// Wraps a failed image read.
    pub fn image_read(content_type: impl Into<EcoString>, source: Error) -> Self {
        Error(Box::new(Repr::ImageRead {
            content_type: content_type.into(),
            source,
        }))
    }

    /// Creates an error for an archive entry that does not exist.
    pub fn missing_entry(path: impl Into<EcoString>) -> Self {
        Error(Box::new(Repr::MissingEntry(path.into())))
    }

    /// Creates an error for a malformed insertion path.
    pub fn invalid_path(input: impl Into<EcoString>, reason: impl Into<Cow<'static, str>>) -> Self {
        Error(Box::new(Repr::InvalidPath {
            input: input.into(),
            reason: reason.into(),
        }))
    }

    /// Whether the error was caused by a failed image read.
    pub fn is_image_read(&self) -> bool {
        matches!(self.0.deref(), Repr::ImageRead { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.deref() {
            Repr::Msg(s) => write!(f, "{s}"),
            Repr::ImageRead {
                content_type,
                source,
            } => write!(f, "failed to read image ({content_type}): {source}"),
            Repr::MissingEntry(path) => write!(f, "archive entry not found: {path}"),
            Repr::InvalidPath { input, reason } => {
                write!(f, "invalid insertion path {input:?}: {reason}")
            }
            Repr::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.0.deref() {
            Repr::ImageRead { source, .. } => Some(source),
            Repr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error(Box::new(Repr::Io(e)))
    }
}

impl From<fmt::Error> for Error {
    fn from(e: fmt::Error) -> Self {
        Error(Box::new(Repr::Msg(e.to_string().into())))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error(Box::new(Repr::Msg(format!("malformed archive: {e}").into())))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error(Box::new(Repr::Msg(format!("malformed document: {e}").into())))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error(Box::new(Repr::Msg(format!("malformed style map: {e}").into())))
    }
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error(Box::new(Repr::Msg(s.into())))
    }
}

impl From<Cow<'static, str>> for Error {
    fn from(s: Cow<'static, str>) -> Self {
        Error(Box::new(Repr::Msg(s)))
    }
}
