//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.claimcare.toml` files.

use crate::models::ChartOptions;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".claimcare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "claimcare_report.md".to_string()
}

/// Dataset source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path or http(s) URL of the columnar dataset.
    #[serde(default = "default_location")]
    pub location: String,

    /// Timeout for remote fetches in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_location() -> String {
    "finance.json".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Chart slice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Schemes shown in the cost structure chart.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Valid schemes shown in the savings utilization tree.
    #[serde(default = "default_top_n")]
    pub utilization_top_n: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            utilization_top_n: default_top_n(),
        }
    }
}

impl From<&ChartsConfig> for ChartOptions {
    fn from(config: &ChartsConfig) -> Self {
        Self {
            top_n: config.top_n,
            utilization_top_n: config.utilization_top_n,
        }
    }
}

fn default_top_n() -> usize {
    10
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the average cost cards.
    #[serde(default = "default_true")]
    pub include_summary_cards: bool,

    /// Maximum rows in per-scheme tables (Markdown only).
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_summary_cards: true,
            max_table_rows: default_max_table_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_table_rows() -> usize {
    50
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref source) = args.source {
            self.source.location = source.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(top_n) = args.top_n {
            self.charts.top_n = top_n;
        }
        if let Some(top_n) = args.tree_top_n {
            self.charts.utilization_top_n = top_n;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check the merged settings. Zero-sized charts and a zero timeout are rejected.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.charts.top_n >= 1, "charts.top_n must be at least 1");
        ensure!(
            self.charts.utilization_top_n >= 1,
            "charts.utilization_top_n must be at least 1"
        );
        ensure!(
            self.source.timeout_seconds >= 1,
            "source.timeout_seconds must be at least 1"
        );
        Ok(())
    }

    /// Log level from the merged settings; `quiet` wins over `verbose`.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
