//! mtree-build library - merge curated and scraped data and publish outputs
//!
//! Pipeline:
//! 1. Optionally normalize a raw catalog listing into the scraped document
//! 2. Load curated documents and the scraped document
//! 3. Check curated ids for duplicates, then merge (curated wins)
//! 4. Validate the merged set; errors from either step stop the build unless skipped
//! 5. Build the lineage tree and statistics
//! 6. Write `models.json`, `relationships.json`, `tree.json`, `stats.json`

use chrono::Utc;
use mtree_common::config::DataLayout;
use mtree_common::loader::{
    load_curated_dir, load_scraped_file, read_json_file, write_build_outputs, write_json_atomic,
    BuildOutputs,
};
use mtree_common::scraped::{normalize_listing, CatalogEntry};
use mtree_common::stats::compute_stats;
use mtree_common::{
    build_tree, validate_post_merge, validate_pre_merge, Dataset, ValidationReport,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Build failures
#[derive(Debug, Error)]
pub enum BuildError {
    /// Curated or merged data has integrity errors
    #[error("Validation failed with {} error(s)", .0.errors.len())]
    ValidationFailed(ValidationReport),

    /// mtree-common error (I/O, parse, tree cycle)
    #[error(transparent)]
    Common(#[from] mtree_common::Error),
}

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub layout: DataLayout,
    /// Publish even when validation reports errors
    pub skip_validation: bool,
    /// Raw catalog listing to normalize into the scraped document first
    pub import_listing: Option<PathBuf>,
}

/// What a build produced
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub models: usize,
    pub relationships: usize,
    pub roots: usize,
    pub tree_nodes: usize,
    pub warnings: usize,
    pub written: Vec<PathBuf>,
}

/// Normalize a raw catalog listing (JSON array) and write it as the scraped document
pub fn import_listing(listing: &Path, scraped_file: &Path) -> Result<usize, BuildError> {
    let entries: Vec<CatalogEntry> = read_json_file(listing)?;
    let document = normalize_listing(entries, Utc::now());

    if let Some(parent) = scraped_file.parent() {
        std::fs::create_dir_all(parent).map_err(mtree_common::Error::from)?;
    }
    write_json_atomic(&document, scraped_file)?;

    info!(
        models = document.dataset.models.len(),
        relationships = document.dataset.relationships.len(),
        "Imported catalog listing {} into {}",
        listing.display(),
        scraped_file.display()
    );
    Ok(document.dataset.models.len())
}

/// Load curated + scraped data, merge them and validate both sides of the merge
pub fn load_merged(layout: &DataLayout) -> Result<(Dataset, ValidationReport), BuildError> {
    let curated = load_curated_dir(&layout.curated_dir)?;
    let scraped = load_scraped_file(&layout.scraped_file)?;

    let mut report = validate_pre_merge(&curated.models);
    let merged = Dataset::merge(curated, scraped.dataset);
    info!(
        models = merged.models.len(),
        relationships = merged.relationships.len(),
        "Merged datasets"
    );
    report.extend(validate_post_merge(&merged.models, &merged.relationships));
    Ok((merged, report))
}

/// Run the full build pipeline
pub fn run_build(options: &BuildOptions) -> Result<BuildSummary, BuildError> {
    let layout = &options.layout;

    if let Some(listing) = &options.import_listing {
        import_listing(listing, &layout.scraped_file)?;
    }

    let (merged, report) = load_merged(layout)?;

    if !report.warnings.is_empty() {
        info!("{} validation warning(s)", report.warnings.len());
    }
    if !report.passed() {
        if options.skip_validation {
            warn!(
                "Publishing despite {} validation error(s) (--skip-validation)",
                report.errors.len()
            );
        } else {
            return Err(BuildError::ValidationFailed(report));
        }
    }

    let tree = build_tree(&merged.models, &merged.relationships).map_err(mtree_common::Error::from)?;
    let stats = compute_stats(&merged.models, &merged.relationships, Utc::now());

    let written = write_build_outputs(
        &layout.output_dir,
        &BuildOutputs {
            models: &merged.models,
            relationships: &merged.relationships,
            tree: &tree,
            stats: &stats,
        },
    )?;

    Ok(BuildSummary {
        models: merged.models.len(),
        relationships: merged.relationships.len(),
        roots: tree.children.len(),
        tree_nodes: tree.node_count() - 1,
        warnings: report.warnings.len(),
        written,
    })
}
