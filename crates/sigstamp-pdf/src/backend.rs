//! Document backend traits.
//!
//! The batch orchestrator drives documents only through these traits, so
//! any implementation (the lopdf one, or an in-memory fake in tests) can
//! sit behind it.

use std::path::Path;

use sigstamp_core::{PageContent, StampRect};

use crate::error::BackendError;
use crate::signature::SignatureImage;

/// Opens documents.
pub trait DocumentBackend {
    /// An open document.
    type Document: StampDocument;

    /// Open the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid
    /// document, or is encrypted.
    fn open(&self, path: &Path) -> Result<Self::Document, BackendError>;
}

/// An open document that can be read, stamped and saved.
///
/// Dropping the document closes it; unsaved insertions are discarded.
pub trait StampDocument {
    /// Read access to one page.
    type Page: PageContent;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Load a page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page geometry
    /// cannot be resolved.
    fn load_page(&self, index: usize) -> Result<Self::Page, BackendError>;

    /// Draw `image` into `rect` (top-left page space) on page `index`,
    /// rotated by `rotation` degrees inside the rect.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range page, an unsupported rotation,
    /// or a page structure that cannot be modified.
    fn insert_image(
        &mut self,
        index: usize,
        rect: StampRect,
        image: &SignatureImage,
        rotation: i32,
    ) -> Result<(), BackendError>;

    /// Write the document, including insertions, to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    fn save(&mut self, path: &Path) -> Result<(), BackendError>;

    /// Write page `index` alone, as it currently looks in memory, to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is out of range or the write fails.
    fn save_page_preview(&self, index: usize, path: &Path) -> Result<(), BackendError>;
}
