use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use sigstamp::BatchConfig;

/// Absolute form of `path`, or `path` itself if it cannot be resolved.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Print where every input and output of the run resolves to.
pub fn echo_paths(config_path: &Path, config: &BatchConfig) {
    eprintln!("config:   {} -> {}", config_path.display(), absolute(config_path).display());
    match config.rules_path() {
        Some(rules) => {
            let abs = absolute(rules);
            eprintln!(
                "rules:    {} -> {} (exists: {})",
                rules.display(),
                abs.display(),
                abs.exists()
            );
        }
        None => eprintln!("rules:    not configured, defaults only"),
    }
    if let Some(manifest) = config.manifest_path() {
        eprintln!("manifest: {} -> {}", manifest.display(), absolute(manifest).display());
    }
    eprintln!("outlog:   {} -> {}", config.outlog.display(), absolute(&config.outlog).display());
    eprintln!("dry-run:  {}", config.dry_run);
}

/// Ask `prompt` on stderr and read one answer from `input`.
///
/// Only `y`/`yes` (any case) confirm; end of input declines.
pub fn confirm(prompt: &str, input: &mut impl BufRead) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
