//! sigstamp: rule-driven signature stamping for batches of PDF documents.
//!
//! This is the facade crate for sigstamp. It loads the batch config, rules
//! and manifest, runs the batch orchestrator over a document backend and
//! writes the placement, error and review reports.
//!
//! # Architecture
//!
//! - **sigstamp-core**: backend-independent placement engine
//! - **sigstamp-pdf**: lopdf document backend and signature image codec
//! - **sigstamp** (this crate): configuration, batch orchestration, reports
//!
//! # Example
//!
//! ```ignore
//! use sigstamp::{BatchConfig, LopdfBackend, process_batch};
//!
//! let config = BatchConfig::load("config/config.yaml".as_ref())?;
//! let summary = process_batch(&LopdfBackend, &config)?;
//! println!("{} placements", summary.placements.len());
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod review;

pub use batch::{BatchSummary, FileReport, GLOBAL_FILE, discover_inputs, process_batch};
pub use config::{
    BatchConfig, ConfigOverrides, ReviewAction, ReviewConfig, ReviewMode, SignatureConfig,
};
pub use error::BatchError;
pub use loader::{load_manifest, load_rules};
pub use report::{ErrorLogRow, LoggedError, PlacementLogRow, ReviewReport, ReviewRow};
pub use review::mark_filename;
pub use sigstamp_core;
pub use sigstamp_pdf;
pub use sigstamp_pdf::{DocumentBackend, LopdfBackend};
