//! Error types for the document backend.
//!
//! [`BackendError`] wraps lopdf, I/O and image failures and converts into
//! [`PlaceError`] so the engine sees one error vocabulary.

use sigstamp_core::PlaceError;
use thiserror::Error;

/// Error type for document backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The document structure could not be read or written.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The signature image could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The document or request uses a feature this backend does not handle.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A core engine error.
    #[error(transparent)]
    Core(#[from] PlaceError),
}

impl BackendError {
    /// Stable tag for the error kind, used in error log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Parse(_) => "Parse",
            BackendError::Io(_) => "Io",
            BackendError::Image(_) => "Image",
            BackendError::Unsupported(_) => "Unsupported",
            BackendError::Core(e) => e.kind(),
        }
    }
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for PlaceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Core(e) => e,
            other => PlaceError::Document(other.to_string()),
        }
    }
}
