//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ClaimCare - cost and savings analytics for medical schemes
///
/// Loads a columnar scheme dataset, derives cost and savings statistics
/// for every dashboard chart, and writes them as a Markdown or JSON report.
///
/// Examples:
///   claimcare --source finance.json
///   claimcare --source https://example.org/finance.json --format json -o dashboard.json
///   claimcare --source finance.json --top-n 5 --tree-top-n 20
///   claimcare --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset location (file path or http(s) URL)
    ///
    /// Defaults to the config file setting, then `finance.json`.
    #[arg(short, long, value_name = "PATH|URL", env = "CLAIMCARE_SOURCE")]
    pub source: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of schemes in the cost structure breakdown
    ///
    /// Schemes are taken in dataset order, not ranked by cost.
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Number of valid schemes in the savings utilization tree
    #[arg(long, value_name = "COUNT")]
    pub tree_top_n: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .claimcare.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Timeout for remote dataset fetches in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 when no records could be loaded
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .claimcare.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref source) = self.source {
            if source.trim().is_empty() {
                return Err("Source must not be empty".to_string());
            }
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if self.tree_top_n == Some(0) {
            return Err("Tree top N must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }
}
