//! sigstamp-pdf: PDF document backend and signature image codec.
//!
//! This crate provides the document layer of sigstamp: opening PDFs,
//! extracting the text and ruled lines placement strategies look at,
//! inserting the signature image and writing outputs and previews.
//! It depends on sigstamp-core for shared data types.

pub mod backend;
mod content;
mod encoding;
pub mod error;
pub mod lopdf_backend;
pub mod signature;
mod standard_fonts;
mod to_unicode;

pub use backend::{DocumentBackend, StampDocument};
pub use error::BackendError;
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfPage};
pub use signature::{SignatureCache, SignatureImage};
pub use sigstamp_core;
