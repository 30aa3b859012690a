//! Fatal batch errors.
//!
//! Only conditions that stop the whole run live here. Narrower failures
//! (one file, row, page or strategy) are recorded in the error log.

use std::path::PathBuf;

use sigstamp_pdf::BackendError;
use thiserror::Error;

/// A condition that aborts the batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("rules file not found: {}", .0.display())]
    RulesNotFound(PathBuf),

    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to load signature {}: {source}", path.display())]
    Signature {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Stable tag naming the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchError::ConfigNotFound(_) => "ConfigNotFound",
            BatchError::InvalidConfig(_) => "InvalidConfig",
            BatchError::RulesNotFound(_) => "RulesNotFound",
            BatchError::ManifestNotFound(_) => "ManifestNotFound",
            BatchError::Read { .. } => "Read",
            BatchError::Yaml { .. } => "Yaml",
            BatchError::Csv { .. } => "Csv",
            BatchError::Signature { .. } => "Signature",
            BatchError::Report { .. } => "Report",
            BatchError::Io(_) => "Io",
        }
    }
}
