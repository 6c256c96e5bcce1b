//! mtree-validate - Data integrity checks
//!
//! Exit code 0 when no errors were found (warnings allowed), 1 otherwise.

use anyhow::{Context, Result};
use clap::Parser;
use mtree_common::config::{load_toml_config_or_default, DataLayout};
use mtree_common::loader::write_json_atomic;
use mtree_validate::{render_report, run_validation, DEFAULT_MAX_WARNINGS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Command-line arguments for mtree-validate
#[derive(Parser, Debug)]
#[command(name = "mtree-validate")]
#[command(about = "Validate model lineage data: duplicate ids, required fields, references, cycles, dates")]
#[command(version)]
struct Args {
    /// Data folder (overrides MTREE_DATA_DIR and the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Validate curated + scraped after merging instead of curated only
    #[arg(long)]
    merged: bool,

    /// Maximum warnings to print
    #[arg(long, default_value_t = DEFAULT_MAX_WARNINGS)]
    max_warnings: usize,

    /// Also write the full report as JSON
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let toml_config = load_toml_config_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting mtree-validate v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let layout = DataLayout::resolve(args.data_dir.as_deref(), &toml_config);
    let (dataset, report) =
        run_validation(&layout, args.merged).context("Failed to load data for validation")?;

    println!(
        "Loaded {} models, {} relationships\n",
        dataset.models.len(),
        dataset.relationships.len()
    );
    print!("{}", render_report(&report, args.max_warnings));

    if let Some(path) = &args.report_json {
        write_json_atomic(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Wrote report to {}", path.display());
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
