//! Rules (YAML) and manifest (CSV) loaders.

use std::path::Path;

use sigstamp_core::{Manifest, ManifestRow, RuleSet};
use tracing::info;

use crate::error::BatchError;

/// Load the rule set.
///
/// No path yields an empty rule set; a configured path that does not exist
/// is fatal.
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet, BatchError> {
    let Some(path) = path else {
        return Ok(RuleSet::default());
    };
    if !path.exists() {
        return Err(BatchError::RulesNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&text, path)?;
    info!(path = %path.display(), rules = rules.rules.len(), "loaded rules");
    Ok(rules)
}

pub(crate) fn parse_rules(text: &str, origin: &Path) -> Result<RuleSet, BatchError> {
    if text.trim().is_empty() {
        return Ok(RuleSet::default());
    }
    serde_yaml::from_str(text).map_err(|source| BatchError::Yaml {
        path: origin.to_path_buf(),
        source,
    })
}

/// Load the manifest, keyed by lower-cased filename.
///
/// No path yields an empty manifest; a configured path that does not exist
/// is fatal. Unknown columns are ignored.
pub fn load_manifest(path: Option<&Path>) -> Result<Manifest, BatchError> {
    let Some(path) = path else {
        return Ok(Manifest::default());
    };
    if !path.exists() {
        return Err(BatchError::ManifestNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = read_manifest(file, path)?;
    info!(path = %path.display(), files = manifest.file_count(), "loaded manifest");
    Ok(manifest)
}

pub(crate) fn read_manifest(reader: impl std::io::Read, origin: &Path) -> Result<Manifest, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<ManifestRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| BatchError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
    Ok(Manifest::from_rows(rows))
}
