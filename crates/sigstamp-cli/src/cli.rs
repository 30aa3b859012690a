use std::path::PathBuf;

use clap::Parser;

/// Stamp a signature image onto every PDF in the configured input folder.
#[derive(Debug, Parser)]
#[command(name = "sigstamp", about, version)]
pub struct Cli {
    /// Batch config file (YAML)
    #[arg(short, long, value_name = "PATH", default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Manifest CSV with per-file overrides
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Rules file (YAML)
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Placement log CSV
    #[arg(long, value_name = "PATH")]
    pub outlog: Option<PathBuf>,

    /// Write single-page previews instead of stamped documents
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Log progress (info level) to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
