//! Manual-review routing of stamped outputs.

use std::path::{Path, PathBuf};

use crate::config::ReviewAction;

/// Insert `prefix` and `suffix` around the file stem, keeping the extension.
pub fn mark_filename(path: &Path, prefix: &str, suffix: &str) -> PathBuf {
    if prefix.is_empty() && suffix.is_empty() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{prefix}{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{prefix}{stem}{suffix}"),
    };
    path.with_file_name(name)
}

/// Where `output` ends up once `action` is applied.
pub fn review_target(output: &Path, output_dir: &Path, action: &ReviewAction) -> PathBuf {
    match action {
        ReviewAction::Rename { prefix, suffix } => mark_filename(output, prefix, suffix),
        ReviewAction::Move { subfolder } => {
            let name = output.file_name().map(PathBuf::from).unwrap_or_default();
            output_dir.join(subfolder).join(name)
        }
    }
}

/// Move `output` to `target`, creating the target folder if needed.
pub fn route_output(output: &Path, target: &Path) -> std::io::Result<()> {
    if output == target {
        return Ok(());
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(output, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_keeps_extension() {
        let marked = mark_filename(Path::new("out/contract.pdf"), "REVIEW_", "_chk");
        assert_eq!(marked, PathBuf::from("out/REVIEW_contract_chk.pdf"));
    }

    #[test]
    fn mark_without_affixes_is_identity() {
        let path = Path::new("out/contract.pdf");
        assert_eq!(mark_filename(path, "", ""), path);
    }

    #[test]
    fn move_target_is_subfolder_of_output_dir() {
        let action = ReviewAction::Move {
            subfolder: "review".to_string(),
        };
        let target = review_target(Path::new("out/a.pdf"), Path::new("out"), &action);
        assert_eq!(target, PathBuf::from("out/review/a.pdf"));
    }

    #[test]
    fn route_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.pdf");
        std::fs::write(&output, b"%PDF").unwrap();
        let target = dir.path().join("review").join("a.pdf");
        route_output(&output, &target).unwrap();
        assert!(!output.exists());
        assert!(target.exists());
    }
}
