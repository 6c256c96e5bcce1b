//! JSON document loading and output writing
//!
//! Curated data is a directory of `*.json` documents, each an object with
//! optional `models` and `relationships` arrays, concatenated in filename
//! order. Scraped data is a single document with the same arrays plus
//! envelope metadata.
//!
//! Records missing `id`, `parent`, `child` or with an unknown relationship
//! `type` fail deserialization here, so they never reach merge/tree/validate.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::merge::Dataset;
use crate::records::{ModelRecord, Relationship};
use crate::stats::DatasetStats;
use crate::tree::TreeNode;
use crate::{Error, Result};

/// Output file names inside the output directory
pub const MODELS_FILE: &str = "models.json";
pub const RELATIONSHIPS_FILE: &str = "relationships.json";
pub const TREE_FILE: &str = "tree.json";
pub const STATS_FILE: &str = "stats.json";

/// Scraped document: dataset plus envelope metadata (not used by the core)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_models: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_relationships: Option<usize>,
    #[serde(flatten)]
    pub dataset: Dataset,
}

/// Read and deserialize one JSON file; errors name the file
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))
}

/// List `*.json` files in `dir`, sorted by file name
pub fn json_files_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load and concatenate every curated document in `dir`
///
/// # Errors
/// `Error::NotFound` if `dir` is not a directory; `Error::InvalidInput` for a
/// document that fails to parse.
pub fn load_curated_dir(dir: &Path) -> Result<Dataset> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!(
            "Curated data directory: {}",
            dir.display()
        )));
    }

    let mut dataset = Dataset::default();
    for path in json_files_sorted(dir)? {
        let document: Dataset = read_json_file(&path)?;
        debug!(
            path = %path.display(),
            models = document.models.len(),
            relationships = document.relationships.len(),
            "Loaded curated document"
        );
        dataset.extend(document);
    }

    info!(
        models = dataset.models.len(),
        relationships = dataset.relationships.len(),
        "Loaded curated data from {}",
        dir.display()
    );
    Ok(dataset)
}

/// Load the scraped document; a missing file yields an empty document
pub fn load_scraped_file(path: &Path) -> Result<ScrapedDocument> {
    if !path.exists() {
        info!("No scraped data at {} (continuing with curated only)", path.display());
        return Ok(ScrapedDocument::default());
    }

    let document: ScrapedDocument = read_json_file(path)?;
    info!(
        models = document.dataset.models.len(),
        relationships = document.dataset.relationships.len(),
        scraped_at = document.scraped_at.as_deref().unwrap_or("unknown"),
        "Loaded scraped data from {}",
        path.display()
    );
    Ok(document)
}

/// Pretty-print `value` to `path` via a temp file and rename
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Everything a build publishes
pub struct BuildOutputs<'a> {
    pub models: &'a [ModelRecord],
    pub relationships: &'a [Relationship],
    pub tree: &'a TreeNode,
    pub stats: &'a DatasetStats,
}

/// Write `models.json`, `relationships.json`, `tree.json`, `stats.json`
///
/// Creates `out_dir` if needed. Returns the written paths in that order.
///
/// `tree.json` serialization recurses once per tree level, so lineage depth is
/// bounded by the calling thread's stack (tens of thousands of levels on the
/// default main-thread stack).
pub fn write_build_outputs(out_dir: &Path, outputs: &BuildOutputs<'_>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let models_path = out_dir.join(MODELS_FILE);
    write_json_atomic(outputs.models, &models_path)?;

    let relationships_path = out_dir.join(RELATIONSHIPS_FILE);
    write_json_atomic(outputs.relationships, &relationships_path)?;

    let tree_path = out_dir.join(TREE_FILE);
    write_json_atomic(outputs.tree, &tree_path)?;

    let stats_path = out_dir.join(STATS_FILE);
    write_json_atomic(outputs.stats, &stats_path)?;

    let written = vec![models_path, relationships_path, tree_path, stats_path];
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
