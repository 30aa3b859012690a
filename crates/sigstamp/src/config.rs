//! Batch configuration loaded from YAML.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sigstamp_core::{MatchSource, StampSettings};

use crate::error::BatchError;

/// Location of the signature image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub path: PathBuf,
}

/// How a file flagged for review is marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Rename the output in place, wrapping its stem in `prefix`/`suffix`.
    Rename { prefix: String, suffix: String },
    /// Move the output into `output_dir/<subfolder>/`.
    Move { subfolder: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    #[default]
    Rename,
    Move,
}

/// Manual-review routing settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub enabled: bool,
    /// Match sources that send a file to review.
    pub sources: Vec<MatchSource>,
    pub report_csv: PathBuf,
    pub mode: ReviewMode,
    pub prefix: String,
    pub suffix: String,
    pub subfolder: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sources: vec![
                MatchSource::RulesFallback,
                MatchSource::NoRulesManifest,
                MatchSource::NoRulesDefault,
            ],
            report_csv: PathBuf::from("output/review_report.csv"),
            mode: ReviewMode::Rename,
            prefix: "REVIEW_".to_string(),
            suffix: String::new(),
            subfolder: "review".to_string(),
        }
    }
}

impl ReviewConfig {
    /// Whether a file classified as `source` is routed to review.
    pub fn selects(&self, source: MatchSource) -> bool {
        self.enabled && self.sources.contains(&source)
    }

    pub fn action(&self) -> ReviewAction {
        match self.mode {
            ReviewMode::Rename => ReviewAction::Rename {
                prefix: self.prefix.clone(),
                suffix: self.suffix.clone(),
            },
            ReviewMode::Move => ReviewAction::Move {
                subfolder: if self.subfolder.trim().is_empty() {
                    "review".to_string()
                } else {
                    self.subfolder.clone()
                },
            },
        }
    }
}

/// Everything a batch run needs besides the rules and the manifest.
///
/// Stamp geometry keys (`x`, `y`, `width`, `height`, `rotation`, `scale`,
/// `keep_aspect`, `page`, `stamp_page_range`) sit at the top level of the
/// file and are collected into [`StampSettings`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub signature: SignatureConfig,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_csv: Option<PathBuf>,
    #[serde(alias = "rules_file")]
    pub rules_yaml: Option<PathBuf>,
    pub outlog: PathBuf,
    pub previews_dir: PathBuf,
    pub dry_run: bool,
    #[serde(flatten)]
    pub stamp: StampSettings,
    pub review: ReviewConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            signature: SignatureConfig::default(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            manifest_csv: None,
            rules_yaml: None,
            outlog: PathBuf::from("output/placement_log.csv"),
            previews_dir: PathBuf::from("previews"),
            dry_run: false,
            stamp: StampSettings::default(),
            review: ReviewConfig::default(),
        }
    }
}

/// Command-line values that replace the file's settings when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub manifest_csv: Option<PathBuf>,
    pub rules_yaml: Option<PathBuf>,
    pub outlog: Option<PathBuf>,
    pub dry_run: bool,
}

fn non_blank(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl BatchConfig {
    /// Parse a config from YAML text and validate it.
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self, BatchError> {
        let config: BatchConfig = if text.trim().is_empty() {
            BatchConfig::default()
        } else {
            serde_yaml::from_str(text).map_err(|source| BatchError::Yaml {
                path: origin.to_path_buf(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the config file at `path`.
    ///
    /// # Errors
    ///
    /// [`BatchError::ConfigNotFound`] if the file does not exist and
    /// [`BatchError::InvalidConfig`] if `signature.path` is missing.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        if !path.exists() {
            return Err(BatchError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }

    fn validate(&self) -> Result<(), BatchError> {
        if self.signature.path.as_os_str().is_empty() {
            return Err(BatchError::InvalidConfig(
                "signature.path must be set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(manifest) = overrides.manifest_csv {
            self.manifest_csv = Some(manifest);
        }
        if let Some(rules) = overrides.rules_yaml {
            self.rules_yaml = Some(rules);
        }
        if let Some(outlog) = overrides.outlog {
            self.outlog = outlog;
        }
        self.dry_run |= overrides.dry_run;
    }

    /// Configured manifest, blank treated as absent.
    pub fn manifest_path(&self) -> Option<&Path> {
        non_blank(&self.manifest_csv)
    }

    /// Configured rules file, blank treated as absent.
    pub fn rules_path(&self) -> Option<&Path> {
        non_blank(&self.rules_yaml)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join("error_log.csv")
    }
}
