//! Signature image decoding and the per-run decode cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sigstamp_core::StampSize;
use tracing::debug;

use crate::error::BackendError;

/// A decoded signature image: 8-bit RGBA pixels, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureImage {
    path: PathBuf,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl std::fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureImage")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl SignatureImage {
    /// Decode any raster format the `image` crate recognises.
    pub fn decode(path: &Path) -> Result<Self, BackendError> {
        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Build from raw RGBA pixels.
    pub fn from_rgba(path: impl Into<PathBuf>, width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, BackendError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(BackendError::Parse(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            path: path.into(),
            width,
            height,
            rgba,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Pixel size used as the intrinsic stamp size.
    pub fn intrinsic_size(&self) -> StampSize {
        StampSize::new(f64::from(self.width), f64::from(self.height))
    }

    /// Split into packed RGB samples and a separate alpha channel.
    pub fn split_alpha(&self) -> (Vec<u8>, Vec<u8>) {
        let pixels = self.rgba.len() / 4;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for px in self.rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, alpha)
    }
}

/// Decoded signatures keyed by canonical path.
///
/// One cache lives for one batch run; each distinct file is decoded once.
#[derive(Debug, Default)]
pub struct SignatureCache {
    entries: HashMap<PathBuf, Arc<SignatureImage>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the decoded image for `path`, decoding it on first use.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist or cannot be decoded.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SignatureImage>, BackendError> {
        let key = path.canonicalize()?;
        if let Some(hit) = self.entries.get(&key) {
            return Ok(Arc::clone(hit));
        }
        let image = Arc::new(SignatureImage::decode(&key)?);
        debug!(path = %key.display(), width = image.width, height = image.height, "decoded signature");
        self.entries.insert(key, Arc::clone(&image));
        Ok(image)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
