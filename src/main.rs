//! ClaimCare - Medical Scheme Cost Analytics
//!
//! A CLI tool that loads a columnar medical scheme dataset, derives
//! cost and savings statistics for each dashboard chart, and writes
//! them as a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, report write failure, etc.)
//!   2 - No records loaded and --fail-on-empty set

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use loader::Source;
use models::{ChartOptions, Report, ReportMetadata};
use report::ReportOptions;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load and check the merged configuration before logging starts
    let config = match load_config(&args).and_then(|mut config| {
        config.merge_with_args(&args);
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("ClaimCare v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Effective config: {:?}", config);

    match run_report(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .claimcare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the source, chart sizes, and report layout.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, aggregate, and write the report. Returns exit code (0 or 2).
async fn run_report(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let source = Source::from(config.source.location.as_str());

    // Step 1: Load the dataset (failures leave it empty)
    if !args.quiet {
        println!("📥 Loading dataset: {}", source);
    }
    let records = {
        let spinner = loading_spinner(args.quiet, &source)?;
        let records = loader::load_or_empty(&source, config.source.timeout()).await;
        spinner.finish_and_clear();
        records
    };

    if records.is_empty() {
        warn!("No scheme records available; charts will be empty");
    }

    // Step 2: Aggregate every chart from the same snapshot
    let chart_options = ChartOptions::from(&config.charts);
    let dashboard = analysis::build_dashboard(&records, &chart_options);

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        record_count: dashboard.record_count,
        valid_record_count: dashboard.valid_record_count,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report {
        metadata,
        dashboard,
    };

    // Step 3: Generate and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &ReportOptions::from(&config.report))
        }
    };

    let output_path = output_path(&args, &config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        let averages = &report.dashboard.average_costs;
        println!("\n📊 Dataset Summary:");
        println!(
            "   Schemes: {} ({} valid for cost analysis)",
            report.metadata.record_count, report.metadata.valid_record_count
        );
        println!(
            "   Average cost - Main: R {:.2} | Adult: R {:.2} | Child: R {:.2}",
            averages.main, averages.adult, averages.child
        );
        println!(
            "\n✅ Report complete! Saved to: {}",
            output_path.display()
        );
    }

    if args.fail_on_empty && report.dashboard.record_count == 0 {
        eprintln!("\n⛔ No scheme records were loaded. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Spinner shown while the dataset loads; hidden in quiet mode.
fn loading_spinner(quiet: bool, source: &Source) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Reading {}", source));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Resolve the report path; JSON output without an explicit path gets a `.json` extension.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let mut path = PathBuf::from(&config.general.output);
    if args.output.is_none() && args.format == OutputFormat::Json {
        path.set_extension("json");
    }
    path
}

/// Load configuration from file or use defaults.
///
/// Runs before the subscriber exists, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
