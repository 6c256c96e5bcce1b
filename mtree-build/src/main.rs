//! mtree-build - Merge curated and scraped model data and publish outputs
//!
//! Reads `<data>/curated/*.json` and `<data>/scraped/huggingface.json`, then
//! writes `models.json`, `relationships.json`, `tree.json` and `stats.json`
//! into `<data>/`.

use anyhow::{Context, Result};
use clap::Parser;
use mtree_build::{run_build, BuildError, BuildOptions};
use mtree_common::config::{load_toml_config_or_default, DataLayout};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for mtree-build
#[derive(Parser, Debug)]
#[command(name = "mtree-build")]
#[command(about = "Merge curated and scraped model data into models, relationships, tree and stats")]
#[command(version)]
struct Args {
    /// Data folder (overrides MTREE_DATA_DIR and the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Write outputs even if validation reports errors
    #[arg(long)]
    skip_validation: bool,

    /// Normalize this raw catalog listing into the scraped document before building
    #[arg(long, value_name = "FILE")]
    import_listing: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_toml_config_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting mtree-build v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let layout = DataLayout::resolve(args.data_dir.as_deref(), &toml_config);
    info!("Data folder: {}", layout.root.display());

    let options = BuildOptions {
        layout,
        skip_validation: args.skip_validation,
        import_listing: args.import_listing,
    };

    match run_build(&options) {
        Ok(summary) => {
            info!(
                models = summary.models,
                relationships = summary.relationships,
                roots = summary.roots,
                tree_nodes = summary.tree_nodes,
                warnings = summary.warnings,
                "Build complete"
            );
            Ok(())
        }
        Err(BuildError::ValidationFailed(report)) => {
            for e in &report.errors {
                error!("{}", e);
            }
            anyhow::bail!(
                "Validation failed with {} error(s); fix curated data or rerun with --skip-validation",
                report.errors.len()
            )
        }
        Err(e) => Err(e).context("Build failed"),
    }
}
