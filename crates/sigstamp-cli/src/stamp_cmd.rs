use sigstamp::{BatchConfig, ConfigOverrides, LopdfBackend, process_batch};

use crate::cli::Cli;
use crate::shared::{confirm, echo_paths};

/// Load the config, confirm, and run the batch.
///
/// Returns `Err(1)` with a message printed to stderr on any fatal error.
pub fn run(cli: &Cli) -> Result<(), i32> {
    let mut config = BatchConfig::load(&cli.config).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    config.apply(ConfigOverrides {
        manifest_csv: cli.manifest.clone(),
        rules_yaml: cli.rules.clone(),
        outlog: cli.outlog.clone(),
        dry_run: cli.dry_run,
    });

    echo_paths(&cli.config, &config);

    if !cli.yes {
        let proceed = confirm("Continue? [y/N] ", &mut std::io::stdin().lock()).map_err(|e| {
            eprintln!("Error: failed to read answer: {e}");
            1
        })?;
        if !proceed {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let summary = process_batch(&LopdfBackend, &config).map_err(|e| {
        tracing::error!(error = %e, "batch aborted");
        eprintln!("Error: {e}");
        1
    })?;

    eprintln!(
        "Processed {} file(s): {} stamped, {} placement(s), {} error(s)",
        summary.files_seen,
        summary.files_stamped,
        summary.placements.len(),
        summary.errors.len()
    );
    eprintln!("Placement log: {}", config.outlog.display());
    if !summary.errors.is_empty() {
        eprintln!("Error log: {}", config.error_log_path().display());
    }
    Ok(())
}
