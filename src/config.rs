//! Sidecar configuration.
//!
//! Loaded from an optional TOML file. Every field has a default so an empty
//! file (or no file at all) yields a working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub attendance: AttendanceConfig,

    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `info` or `attendanced=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Rolling window used when a request omits `windowDays`.
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,

    /// Students under this percentage show up in the low-attendance report.
    #[serde(default = "default_low_attendance_threshold")]
    pub low_attendance_threshold: f64,

    /// Number of records returned in a student summary's `recent` list.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
            low_attendance_threshold: default_low_attendance_threshold(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_window_days() -> u32 {
    30
}

fn default_low_attendance_threshold() -> f64 {
    75.0
}

fn default_recent_limit() -> usize {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Load the demo roster and records at startup.
    #[serde(default)]
    pub sample_data: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let t = self.attendance.low_attendance_threshold;
        if !(0.0..=100.0).contains(&t) {
            anyhow::bail!("attendance.low_attendance_threshold must be within 0..=100, got {t}");
        }
        Ok(())
    }
}
