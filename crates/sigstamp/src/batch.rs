//! Batch orchestration.
//!
//! Files are processed one at a time, then manifest rows per file, then
//! candidate pages per row. Every failure below the batch scope is recorded
//! in the error log with a scope tag and processing moves on:
//!
//! | scope | effect |
//! |---|---|
//! | `open_pdf`, `validate_pdf` | file skipped |
//! | `load_rules_for_file` | file processed with defaults only |
//! | `resolve_pages`, `resolve_geometry` | row skipped |
//! | `anchor_page_N`, `line_detection_page_N` | cascade continues |
//! | `process_page_N`, `insert_image_page_N`, `dry_run_render_page_N` | page skipped |
//! | `dry_run_reopen_doc` | rest of the file skipped |
//! | `save_pdf`, `review_<file>` | output missing or not routed |
//!
//! Only a signature that cannot be loaded stops the batch.

use std::path::{Path, PathBuf};

use sigstamp_core::{
    CascadeOutcome, FileTally, Manifest, ManifestRow, PlaceError, PlacementDecision, RowGeometry,
    RuleSet, RuleView, StampOutcome, classify, resolve_page_set, run_cascade,
};
use sigstamp_pdf::{DocumentBackend, SignatureCache, SignatureImage, StampDocument};
use tracing::{debug, error, info, warn};

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::loader::{load_manifest, load_rules};
use crate::report::{
    ErrorLogRow, LoggedError, PlacementLogRow, ReviewReport, ReviewRow, write_error_log,
    write_placement_log,
};
use crate::review::{review_target, route_output};

/// `file` column value for failures not tied to a document.
pub const GLOBAL_FILE: &str = "(global)";

/// Result for one processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file: String,
    pub outcome: StampOutcome,
    pub placements: usize,
    /// Saved output, after any review routing. `None` in dry-run or when
    /// saving failed.
    pub output_path: Option<PathBuf>,
}

/// What a batch run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub files_seen: usize,
    /// Files with at least one placement.
    pub files_stamped: usize,
    pub placements: Vec<PlacementLogRow>,
    pub errors: Vec<ErrorLogRow>,
    /// Documents that got past open and validation, in processing order.
    pub files: Vec<FileReport>,
}

enum PageFlow {
    Next,
    StopRow,
    AbortFile,
}

struct Batch<'a, B: DocumentBackend> {
    backend: &'a B,
    config: &'a BatchConfig,
    rules: &'a RuleSet,
    manifest: &'a Manifest,
    signature: &'a SignatureImage,
    placements: Vec<PlacementLogRow>,
    errors: Vec<ErrorLogRow>,
}

/// Run a batch over every PDF in `config.input_dir`.
///
/// Writes the placement log to `config.outlog` and, when anything failed,
/// the error log to `<output_dir>/error_log.csv`.
///
/// # Errors
///
/// Returns [`BatchError`] when the rules, manifest or signature cannot be
/// loaded, the input folder cannot be listed, or a report cannot be
/// written. A signature failure is written to the error log first.
pub fn process_batch<B: DocumentBackend>(
    backend: &B,
    config: &BatchConfig,
) -> Result<BatchSummary, BatchError> {
    std::fs::create_dir_all(&config.output_dir)?;
    let manifest = load_manifest(config.manifest_path())?;
    let rules = load_rules(config.rules_path())?;
    if config.dry_run {
        std::fs::create_dir_all(&config.previews_dir)?;
    }

    let mut cache = SignatureCache::new();
    let signature = match cache.get_or_load(&config.signature.path) {
        Ok(signature) => signature,
        Err(source) => {
            let err = BatchError::Signature {
                path: config.signature.path.clone(),
                source,
            };
            error!(error = %err, "cannot load signature");
            let row = ErrorLogRow::new(GLOBAL_FILE, "load_signature", &err);
            write_error_log(&config.error_log_path(), &[row])?;
            return Err(err);
        }
    };

    let inputs = discover_inputs(&config.input_dir)?;
    info!(
        files = inputs.len(),
        dry_run = config.dry_run,
        input_dir = %config.input_dir.display(),
        "starting batch"
    );

    let mut batch = Batch {
        backend,
        config,
        rules: &rules,
        manifest: &manifest,
        signature: &signature,
        placements: Vec::new(),
        errors: Vec::new(),
    };
    let mut files = Vec::new();
    for path in &inputs {
        if let Some(report) = batch.process_file(path) {
            files.push(report);
        }
    }
    let Batch {
        placements, errors, ..
    } = batch;

    write_placement_log(&config.outlog, &placements)?;
    if !errors.is_empty() {
        write_error_log(&config.error_log_path(), &errors)?;
    }

    let summary = BatchSummary {
        files_seen: inputs.len(),
        files_stamped: files.iter().filter(|f| f.placements > 0).count(),
        placements,
        errors,
        files,
    };
    info!(
        files = summary.files_seen,
        stamped = summary.files_stamped,
        placements = summary.placements.len(),
        errors = summary.errors.len(),
        "batch finished"
    );
    Ok(summary)
}

/// PDFs directly inside `dir` (extension matched case-insensitively),
/// sorted by file name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let entries = std::fs::read_dir(dir).map_err(|source| BatchError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

impl<'a, B: DocumentBackend> Batch<'a, B> {
    fn record(&mut self, file: &str, scope: impl Into<String>, err: &dyn LoggedError) {
        let row = ErrorLogRow::new(file, scope, err);
        warn!(file, scope = %row.scope, error = %row.error, "recorded failure");
        self.errors.push(row);
    }

    fn process_file(&mut self, path: &Path) -> Option<FileReport> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(file = %name, "processing file");

        let mut doc = match self.backend.open(path) {
            Ok(doc) => doc,
            Err(e) => {
                self.record(&name, "open_pdf", &e);
                return None;
            }
        };
        let page_count = doc.page_count();
        if page_count == 0 {
            self.record(
                &name,
                "validate_pdf",
                &PlaceError::Document("PDF has no pages".to_string()),
            );
            return None;
        }

        let (rules, manifest, config) = (self.rules, self.manifest, self.config);
        let rule = match rules.select(&name) {
            Ok(rule) => rule,
            Err(e) => {
                self.record(&name, "load_rules_for_file", &e);
                None
            }
        };
        let view = rules.view(rule);

        let manifest_rows = manifest.rows_for(&name);
        let synthetic = [ManifestRow::default()];
        let rows: &[ManifestRow] = if manifest_rows.is_empty() {
            &synthetic
        } else {
            manifest_rows
        };

        let settings = &config.stamp;
        let intrinsic = self.signature.intrinsic_size();
        let mut tally = FileTally::new();

        'rows: for row in rows {
            let pages = match resolve_page_set(row, settings, &view, page_count) {
                Ok(pages) => pages,
                Err(e) => {
                    self.record(&name, "resolve_pages", &e);
                    continue;
                }
            };
            let geometry = match RowGeometry::resolve(row, settings, view.defaults(), intrinsic) {
                Ok(geometry) => geometry,
                Err(e) => {
                    self.record(&name, "resolve_geometry", &e);
                    continue;
                }
            };
            debug!(
                file = %name,
                pages = ?pages.pages(),
                prefer_last = pages.prefer_last(),
                "resolved row"
            );

            for page_number in pages.iteration_order() {
                let flow =
                    self.process_page(&mut doc, path, &name, page_number, &view, &geometry, &mut tally);
                match flow {
                    PageFlow::Next => {}
                    PageFlow::StopRow => break,
                    PageFlow::AbortFile => break 'rows,
                }
            }
        }

        let output_path = if config.dry_run {
            None
        } else {
            let out = config.output_dir.join(&name);
            match doc.save(&out) {
                Ok(()) => Some(out),
                Err(e) => {
                    self.record(&name, "save_pdf", &e);
                    None
                }
            }
        };
        drop(doc);

        let outcome = classify(
            rule,
            !view.anchors().is_empty(),
            !manifest_rows.is_empty(),
            &tally,
        );
        info!(
            file = %name,
            match_source = %outcome.match_source,
            placements = tally.placements(),
            "finished file"
        );
        let output_path = self.route_for_review(&name, &outcome, output_path);

        Some(FileReport {
            file: name,
            outcome,
            placements: tally.placements(),
            output_path,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn process_page(
        &mut self,
        doc: &mut B::Document,
        path: &Path,
        name: &str,
        page_number: usize,
        view: &RuleView<'_>,
        geometry: &RowGeometry,
        tally: &mut FileTally,
    ) -> PageFlow {
        let index = page_number - 1;
        let page = match doc.load_page(index) {
            Ok(page) => page,
            Err(e) => {
                self.record(name, format!("process_page_{page_number}"), &e);
                return PageFlow::Next;
            }
        };

        let CascadeOutcome { decision, failures } = run_cascade(&page, page_number, view, geometry);
        for failure in &failures {
            self.record(name, failure.scope(), &failure.error);
        }
        debug!(
            file = name,
            page = page_number,
            strategy = %decision.strategy,
            x = decision.origin.x,
            y = decision.origin.y,
            "placement decided"
        );
        if decision.off_page {
            warn!(
                file = name,
                page = page_number,
                strategy = %decision.strategy,
                "stamp extends beyond the page"
            );
        }

        let rect = decision.rect();
        let signature = self.signature;
        let placed_flow = if decision.strategy.is_anchor() {
            PageFlow::StopRow
        } else {
            PageFlow::Next
        };

        if !self.config.dry_run {
            return match doc.insert_image(index, rect, signature, decision.rotation) {
                Ok(()) => {
                    self.accept(name, &decision, tally);
                    placed_flow
                }
                Err(e) => {
                    self.record(name, format!("insert_image_page_{page_number}"), &e);
                    PageFlow::Next
                }
            };
        }

        let preview = self.preview_path(name, page_number);
        let rendered = doc
            .insert_image(index, rect, signature, decision.rotation)
            .and_then(|()| doc.save_page_preview(index, &preview));
        let flow = match rendered {
            Ok(()) => {
                self.accept(name, &decision, tally);
                placed_flow
            }
            Err(e) => {
                self.record(name, format!("dry_run_render_page_{page_number}"), &e);
                PageFlow::Next
            }
        };

        // Previews must never show stamps from earlier attempts.
        match self.backend.open(path) {
            Ok(fresh) => *doc = fresh,
            Err(e) => {
                self.record(name, "dry_run_reopen_doc", &e);
                return PageFlow::AbortFile;
            }
        }
        flow
    }

    fn accept(&mut self, name: &str, decision: &PlacementDecision, tally: &mut FileTally) {
        tally.record(decision);
        self.placements.push(PlacementLogRow::new(name, decision));
    }

    fn preview_path(&self, name: &str, page_number: usize) -> PathBuf {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.config
            .previews_dir
            .join(stem)
            .join(format!("page-{page_number}.pdf"))
    }

    /// Report and route a file classified for review; returns where its
    /// output ended up.
    fn route_for_review(
        &mut self,
        name: &str,
        outcome: &StampOutcome,
        output: Option<PathBuf>,
    ) -> Option<PathBuf> {
        let config = self.config;
        let review = &config.review;
        if !review.selects(outcome.match_source) {
            return output;
        }

        let action = review.action();
        let target = output
            .as_deref()
            .map(|out| review_target(out, &config.output_dir, &action));
        let row = ReviewRow {
            filename: name.to_string(),
            match_source: outcome.match_source.to_string(),
            rule_name: outcome.rule_name.clone().unwrap_or_default(),
            reason: outcome.reason.clone(),
            pages_affected: outcome.pages_affected,
            output_path: target
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        };
        let scope = format!("review_{name}");
        if let Err(e) = ReviewReport::new(&review.report_csv).append(&row) {
            self.record(name, scope.clone(), &e);
        }

        match (output, target) {
            (Some(output), Some(target)) => match route_output(&output, &target) {
                Ok(()) => {
                    info!(file = %name, to = %target.display(), "routed to review");
                    Some(target)
                }
                Err(e) => {
                    self.record(name, scope, &BatchError::Io(e));
                    Some(output)
                }
            },
            (output, _) => output,
        }
    }
}
