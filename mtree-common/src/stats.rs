//! Descriptive dataset statistics

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::records::{ModelRecord, Relationship};

/// Summary counts written to `stats.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_models: usize,
    pub total_relationships: usize,
    /// RFC 3339 UTC timestamp of the build
    pub last_updated: String,
    pub companies: BTreeMap<String, usize>,
    pub modalities: BTreeMap<String, usize>,
    pub models_by_year: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
}

/// Compute statistics at `now`
///
/// Missing company/modality count under `"unknown"`; models without a release
/// date are left out of `modelsByYear`.
pub fn compute_stats(
    models: &[ModelRecord],
    relationships: &[Relationship],
    now: DateTime<Utc>,
) -> DatasetStats {
    let mut companies = BTreeMap::new();
    let mut modalities = BTreeMap::new();
    let mut models_by_year = BTreeMap::new();

    for model in models {
        *companies.entry(model.company_or_unknown().to_string()).or_insert(0) += 1;
        *modalities.entry(model.modality_or_unknown().to_string()).or_insert(0) += 1;
        if let Some(year) = model.release_year() {
            *models_by_year.entry(year.to_string()).or_insert(0) += 1;
        }
    }

    let mut relationships_by_type = BTreeMap::new();
    for rel in relationships {
        *relationships_by_type
            .entry(rel.relation_type.to_string())
            .or_insert(0) += 1;
    }

    DatasetStats {
        total_models: models.len(),
        total_relationships: relationships.len(),
        last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        companies,
        modalities,
        models_by_year,
        relationships_by_type,
    }
}
