//! Placement, error and review CSV reports.

use std::fs::OpenOptions;
use std::path::Path;

use serde::Serialize;
use sigstamp_core::{PlaceError, PlacementDecision};
use sigstamp_pdf::BackendError;

use crate::error::BatchError;

const PLACEMENT_HEADER: [&str; 8] = ["file", "page", "strategy", "x", "y", "w", "h", "rotation"];
const ERROR_HEADER: [&str; 4] = ["file", "where", "error", "stack"];
const REVIEW_HEADER: [&str; 6] = [
    "filename",
    "match_source",
    "rule_name",
    "reason",
    "pages_affected",
    "output_path",
];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One successful page placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementLogRow {
    pub file: String,
    pub page: usize,
    pub strategy: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub rotation: i32,
}

impl PlacementLogRow {
    pub fn new(file: &str, decision: &PlacementDecision) -> Self {
        Self {
            file: file.to_string(),
            page: decision.page,
            strategy: decision.strategy.to_string(),
            x: round2(decision.origin.x),
            y: round2(decision.origin.y),
            w: round2(decision.size.width),
            h: round2(decision.size.height),
            rotation: decision.rotation,
        }
    }
}

/// An error that can be written to the error log.
pub trait LoggedError: std::error::Error {
    /// Stable CamelCase tag for the `error` column.
    fn kind(&self) -> &'static str;
}

impl LoggedError for PlaceError {
    fn kind(&self) -> &'static str {
        PlaceError::kind(self)
    }
}

impl LoggedError for BackendError {
    fn kind(&self) -> &'static str {
        BackendError::kind(self)
    }
}

impl LoggedError for BatchError {
    fn kind(&self) -> &'static str {
        BatchError::kind(self)
    }
}

/// One caught failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLogRow {
    pub file: String,
    /// Scope tag naming the stage that failed.
    #[serde(rename = "where")]
    pub scope: String,
    pub error: String,
    /// The error's source chain, `outer <- inner`.
    pub stack: String,
}

impl ErrorLogRow {
    pub fn new(file: &str, scope: impl Into<String>, err: &dyn LoggedError) -> Self {
        let mut stack = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            stack.push_str(" <- ");
            stack.push_str(&inner.to_string());
            source = inner.source();
        }
        Self {
            file: file.to_string(),
            scope: scope.into(),
            error: format!("{}: {err}", err.kind()),
            stack,
        }
    }
}

/// One file routed to manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub filename: String,
    pub match_source: String,
    pub rule_name: String,
    pub reason: String,
    pub pages_affected: usize,
    pub output_path: String,
}

fn report_error(path: &Path) -> impl FnOnce(csv::Error) -> BatchError + '_ {
    move |source| BatchError::Report {
        path: path.to_path_buf(),
        source,
    }
}

fn create_parent(path: &Path) -> Result<(), BatchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), BatchError> {
    create_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(report_error(path))?;
    writer.write_record(header).map_err(report_error(path))?;
    for row in rows {
        writer.serialize(row).map_err(report_error(path))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the placement log; the header is written even with no rows.
pub fn write_placement_log(path: &Path, rows: &[PlacementLogRow]) -> Result<(), BatchError> {
    write_rows(path, &PLACEMENT_HEADER, rows)
}

pub fn write_error_log(path: &Path, rows: &[ErrorLogRow]) -> Result<(), BatchError> {
    write_rows(path, &ERROR_HEADER, rows)
}

/// Append-only review report.
///
/// The header is written when the file is new or empty, so it appears
/// once however many rows a run appends.
#[derive(Debug, Clone)]
pub struct ReviewReport<'a> {
    path: &'a Path,
}

impl<'a> ReviewReport<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    pub fn append(&self, row: &ReviewRow) -> Result<(), BatchError> {
        create_parent(self.path)?;
        let file = OpenOptions::new().create(true).append(true).open(self.path)?;
        let is_empty = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(REVIEW_HEADER).map_err(report_error(self.path))?;
        }
        writer.serialize(row).map_err(report_error(self.path))?;
        writer.flush()?;
        Ok(())
    }
}
