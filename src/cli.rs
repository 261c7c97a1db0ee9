use clap::Parser;
use std::path::PathBuf;

/// Attendance aggregation sidecar.
///
/// Reads one JSON request per line on stdin and writes one JSON response per
/// line on stdout. Logs go to stderr.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE", env = "ATTENDANCED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive; overrides `log.level` from the config
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Load the demo roster and records at startup
    #[arg(long)]
    pub sample_data: bool,
}
