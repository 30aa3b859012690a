//! Batch-level stamp settings and per-row geometry resolution.

use crate::error::PlaceError;
use crate::manifest::ManifestRow;
use crate::rules::Defaults;
use crate::sizing::StampSize;

/// Stamp geometry configured for the whole batch.
///
/// Every field is a fallback for the matching manifest column.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct StampSettings {
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: i32,
    pub scale: Option<f64>,
    pub keep_aspect: Option<bool>,
    pub page: Option<i64>,
    pub stamp_page_range: Option<String>,
}

impl StampSettings {
    /// Configured default range, blank treated as absent.
    pub fn stamp_page_range(&self) -> Option<&str> {
        self.stamp_page_range
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Geometry for one manifest row after applying precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    /// Absolute fallback position.
    pub x: f64,
    pub y: f64,
    pub size: StampSize,
    pub rotation: i32,
}

impl RowGeometry {
    /// Resolve a row's geometry.
    ///
    /// Precedence per field: row, then batch settings, then rule defaults
    /// (scale and keep_aspect only); keep_aspect finally defaults to true.
    /// The stamp size is derived from `intrinsic` via [`StampSize::compute`].
    pub fn resolve(
        row: &ManifestRow,
        settings: &StampSettings,
        defaults: &Defaults,
        intrinsic: StampSize,
    ) -> Result<Self, PlaceError> {
        let x = row.x()?.unwrap_or(settings.x);
        let y = row.y()?.unwrap_or(settings.y);
        let width = row.width()?.or(settings.width);
        let height = row.height()?.or(settings.height);
        let scale = row.scale()?.or(settings.scale).or(defaults.scale);
        let rotation = row.rotation()?.unwrap_or(settings.rotation);
        let keep_aspect = row
            .keep_aspect()?
            .or(settings.keep_aspect)
            .or(defaults.keep_aspect)
            .unwrap_or(true);

        Ok(Self {
            x,
            y,
            size: StampSize::compute(intrinsic, width, height, scale, keep_aspect),
            rotation,
        })
    }
}
