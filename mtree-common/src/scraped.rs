//! Normalization of scraped catalog listings
//!
//! Turns raw Hugging Face model listing entries (`/api/models?full=true&cardData=true`
//! JSON shape) into model records and inferred relationships. Fetching the
//! listing is left to external tooling; this module only reshapes records.
//!
//! Relationship inference policy:
//! - `base_model:<parent>` → `base`
//! - `base_model:<type>:<parent>` → `<type>`
//! - `base_model:<type>:<a>:<b>` → `<type>` with parent `<a>:<b>`
//! - `cardData.base_model` (string) → `base`, unless an edge between the same
//!   pair was already inferred from tags
//!
//! Types are lowercased and trimmed; `quantized` becomes `quantization` and
//! unrecognized types become `base`. All inferred edges are `silver`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::ids::ModelId;
use crate::loader::ScrapedDocument;
use crate::merge::Dataset;
use crate::records::{ModelRecord, RelationType, Relationship, CONFIDENCE_SILVER, UNKNOWN};

/// Provenance of records and tag-derived edges
pub const SOURCE_API: &str = "huggingface-api";

/// Provenance of edges derived from model card metadata
pub const SOURCE_CARD_DATA: &str = "huggingface-carddata";

const BASE_MODEL_TAG: &str = "base_model";

/// One entry of a raw catalog listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "pipeline_tag")]
    pub pipeline_tag: Option<String>,
    #[serde(default, rename = "library_name")]
    pub library_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub card_data: Option<Value>,
}

/// Parse a `base_model:...` tag into `(parent, type)`
pub fn parse_base_model_tag(tag: &str) -> Option<(ModelId, RelationType)> {
    let parts: Vec<&str> = tag.split(':').collect();
    if parts.first() != Some(&BASE_MODEL_TAG) {
        return None;
    }

    match parts.as_slice() {
        [_, parent] => Some((ModelId::from(*parent), RelationType::Base)),
        [_, kind, parent] => Some((ModelId::from(*parent), RelationType::from_catalog_tag(kind))),
        [_, kind, org, name] => Some((
            ModelId::from(format!("{}:{}", org, name)),
            RelationType::from_catalog_tag(kind),
        )),
        _ => None,
    }
}

fn inferred(parent: ModelId, child: &ModelId, relation_type: RelationType, source: &str) -> Relationship {
    Relationship::new(parent, child.clone(), relation_type)
        .with_source(source)
        .with_confidence(CONFIDENCE_SILVER)
}

/// Normalize one listing entry into a model record and its inferred edges
pub fn normalize_entry(entry: &CatalogEntry) -> (ModelRecord, Vec<Relationship>) {
    let id = ModelId::from(entry.id.as_str());

    let mut model = ModelRecord::new(id.clone())
        .with_name(id.base_name())
        .with_company(entry.author.as_deref().unwrap_or(UNKNOWN))
        .with_attribute("downloads", json!(entry.downloads.unwrap_or(0)))
        .with_attribute("likes", json!(entry.likes.unwrap_or(0)))
        .with_attribute("tags", json!(entry.tags))
        .with_attribute("pipeline_tag", json!(entry.pipeline_tag))
        .with_attribute("library_name", json!(entry.library_name))
        .with_attribute("created_at", json!(entry.created_at))
        .with_attribute("last_modified", json!(entry.last_modified))
        .with_attribute("source", json!(SOURCE_API));

    if let Some(config) = &entry.config {
        let architecture = config
            .get("architectures")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .cloned()
            .unwrap_or(Value::Null);
        let model_type = config.get("model_type").cloned().unwrap_or(Value::Null);
        model = model
            .with_attribute("architecture", architecture)
            .with_attribute("model_type", model_type);
    }

    let mut relationships: Vec<Relationship> = entry
        .tags
        .iter()
        .filter_map(|tag| parse_base_model_tag(tag))
        .map(|(parent, kind)| inferred(parent, &id, kind, SOURCE_API))
        .collect();

    let card_base = entry
        .card_data
        .as_ref()
        .and_then(|c| c.get(BASE_MODEL_TAG))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    if let Some(parent) = card_base {
        let already_linked = relationships.iter().any(|r| r.parent.as_str() == parent);
        if !already_linked {
            relationships.push(inferred(ModelId::from(parent), &id, RelationType::Base, SOURCE_CARD_DATA));
        }
    }

    (model, relationships)
}

/// Normalize a full listing into a scraped document
///
/// Repeated ids are skipped after their first occurrence.
pub fn normalize_listing(
    entries: impl IntoIterator<Item = CatalogEntry>,
    scraped_at: DateTime<Utc>,
) -> ScrapedDocument {
    let mut seen: HashSet<String> = HashSet::new();
    let mut dataset = Dataset::default();
    let mut skipped = 0usize;

    for entry in entries {
        if !seen.insert(entry.id.clone()) {
            skipped += 1;
            continue;
        }
        let (model, relationships) = normalize_entry(&entry);
        dataset.models.push(model);
        dataset.relationships.extend(relationships);
    }

    debug!(
        models = dataset.models.len(),
        relationships = dataset.relationships.len(),
        repeated_ids = skipped,
        "Normalized catalog listing"
    );

    ScrapedDocument {
        scraped_at: Some(scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        total_models: Some(dataset.models.len()),
        total_relationships: Some(dataset.relationships.len()),
        dataset,
    }
}
