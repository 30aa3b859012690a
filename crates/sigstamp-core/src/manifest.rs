//! Per-file stamp overrides read from a tabular manifest.
//!
//! Rows are kept as raw optional strings exactly as read; typed accessors
//! apply one normalisation rule (trim, blank means absent) and report
//! unparseable values as [`PlaceError::InvalidField`].

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::PlaceError;

/// One manifest row: a stamp override for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ManifestRow {
    pub filename: Option<String>,
    pub page: Option<String>,
    pub stamp_page_range: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub scale: Option<String>,
    pub rotation: Option<String>,
    pub keep_aspect: Option<String>,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn typed<T: FromStr>(field: &str, raw: &Option<String>) -> Result<Option<T>, PlaceError> {
    match present(raw) {
        None => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| PlaceError::InvalidField {
            field: field.to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse a boolean flag: true/false, yes/no, 1/0 (case-insensitive).
pub fn parse_flag(field: &str, value: &str) -> Result<bool, PlaceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(PlaceError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

impl ManifestRow {
    /// Row keyed to `filename` with every override absent.
    pub fn for_file(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    /// Lookup key: trimmed, lower-cased filename.
    pub fn key(&self) -> Option<String> {
        present(&self.filename).map(str::to_lowercase)
    }

    pub fn page(&self) -> Result<Option<i64>, PlaceError> {
        typed("page", &self.page)
    }

    pub fn stamp_page_range(&self) -> Option<&str> {
        present(&self.stamp_page_range)
    }

    pub fn x(&self) -> Result<Option<f64>, PlaceError> {
        typed("x", &self.x)
    }

    pub fn y(&self) -> Result<Option<f64>, PlaceError> {
        typed("y", &self.y)
    }

    pub fn width(&self) -> Result<Option<f64>, PlaceError> {
        typed("width", &self.width)
    }

    pub fn height(&self) -> Result<Option<f64>, PlaceError> {
        typed("height", &self.height)
    }

    pub fn scale(&self) -> Result<Option<f64>, PlaceError> {
        typed("scale", &self.scale)
    }

    pub fn rotation(&self) -> Result<Option<i32>, PlaceError> {
        typed("rotation", &self.rotation)
    }

    pub fn keep_aspect(&self) -> Result<Option<bool>, PlaceError> {
        present(&self.keep_aspect)
            .map(|s| parse_flag("keep_aspect", s))
            .transpose()
    }
}

/// Manifest rows grouped by lower-cased filename, in file order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    by_file: HashMap<String, Vec<ManifestRow>>,
}

impl Manifest {
    /// Group rows by filename. Rows with a blank filename are ignored.
    pub fn from_rows(rows: impl IntoIterator<Item = ManifestRow>) -> Self {
        let mut by_file: HashMap<String, Vec<ManifestRow>> = HashMap::new();
        for row in rows {
            if let Some(key) = row.key() {
                by_file.entry(key).or_default().push(row);
            }
        }
        Self { by_file }
    }

    /// Rows for `filename` (matched case-insensitively); empty if none.
    pub fn rows_for(&self, filename: &str) -> &[ManifestRow] {
        self.by_file
            .get(&filename.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct files with at least one row.
    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(filename: &str) -> ManifestRow {
        ManifestRow::for_file(filename)
    }

    #[test]
    fn blank_fields_are_absent() {
        let mut row = make_row("a.pdf");
        row.x = Some("   ".to_string());
        row.stamp_page_range = Some(String::new());
        assert_eq!(row.x().unwrap(), None);
        assert_eq!(row.stamp_page_range(), None);
    }

    #[test]
    fn typed_fields_trim_and_parse() {
        let mut row = make_row("a.pdf");
        row.x = Some(" 12.5 ".to_string());
        row.page = Some("3".to_string());
        row.rotation = Some("90".to_string());
        assert_eq!(row.x().unwrap(), Some(12.5));
        assert_eq!(row.page().unwrap(), Some(3));
        assert_eq!(row.rotation().unwrap(), Some(90));
    }

    #[test]
    fn unparseable_field_is_invalid_field() {
        let mut row = make_row("a.pdf");
        row.width = Some("wide".to_string());
        let err = row.width().unwrap_err();
        assert_eq!(
            err,
            PlaceError::InvalidField {
                field: "width".to_string(),
                value: "wide".to_string(),
            }
        );
    }

    #[test]
    fn keep_aspect_accepts_common_spellings() {
        let mut row = make_row("a.pdf");
        for (raw, expected) in [("TRUE", true), ("yes", true), ("1", true), ("No", false), ("0", false)] {
            row.keep_aspect = Some(raw.to_string());
            assert_eq!(row.keep_aspect().unwrap(), Some(expected), "{raw}");
        }
        row.keep_aspect = Some("maybe".to_string());
        assert!(row.keep_aspect().is_err());
    }

    #[test]
    fn manifest_groups_case_insensitively() {
        let mut second = make_row("CONTRACT.pdf");
        second.page = Some("2".to_string());
        let manifest = Manifest::from_rows(vec![make_row(" contract.pdf "), second, make_row("other.pdf")]);
        let rows = manifest.rows_for("Contract.PDF");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].page().unwrap(), Some(2));
        assert_eq!(manifest.file_count(), 2);
    }

    #[test]
    fn manifest_ignores_blank_filenames() {
        let manifest = Manifest::from_rows(vec![make_row("  "), ManifestRow::default()]);
        assert!(manifest.is_empty());
    }

    #[test]
    fn rows_for_unknown_file_is_empty() {
        let manifest = Manifest::from_rows(vec![make_row("a.pdf")]);
        assert!(manifest.rows_for("b.pdf").is_empty());
    }
}
