//! Curated/scraped dataset merging
//!
//! Merge strategy: curated records always win. A curated model shadows any
//! scraped model with the same id as a whole record (no field-level merge).
//! Relationships are deduplicated on `(parent, child, type)`, first seen wins,
//! curated before scraped.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::ids::ModelId;
use crate::records::{ModelRecord, Relationship, RelationshipKey};

/// A model collection plus a relationship collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub models: Vec<ModelRecord>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Dataset {
    pub fn new(models: Vec<ModelRecord>, relationships: Vec<Relationship>) -> Self {
        Self {
            models,
            relationships,
        }
    }

    /// Append another dataset (used to concatenate curated documents)
    pub fn extend(&mut self, other: Dataset) {
        self.models.extend(other.models);
        self.relationships.extend(other.relationships);
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.relationships.is_empty()
    }

    /// Merge `curated` with `scraped`, curated taking priority
    pub fn merge(curated: Dataset, scraped: Dataset) -> Dataset {
        let (models, relationships) = merge(
            curated.models,
            curated.relationships,
            scraped.models,
            scraped.relationships,
        );
        Dataset {
            models,
            relationships,
        }
    }
}

/// Merge curated and scraped collections.
///
/// **Models:** keyed by id. Curated models are inserted first; a scraped
/// model is only kept when its id has not been seen. Output order is
/// first-insertion order of each id. A curated id repeated within the curated
/// set keeps its first position and takes the later record.
///
/// **Relationships:** kept in encounter order (curated, then scraped),
/// skipping any whose `(parent, child, type)` key was already kept.
pub fn merge(
    curated_models: Vec<ModelRecord>,
    curated_rels: Vec<Relationship>,
    scraped_models: Vec<ModelRecord>,
    scraped_rels: Vec<Relationship>,
) -> (Vec<ModelRecord>, Vec<Relationship>) {
    let curated_count = curated_models.len();
    let scraped_count = scraped_models.len();

    let mut models: Vec<ModelRecord> = Vec::with_capacity(curated_count + scraped_count);
    let mut position: HashMap<ModelId, usize> = HashMap::with_capacity(curated_count + scraped_count);

    for model in curated_models {
        match position.get(&model.id) {
            Some(&idx) => models[idx] = model,
            None => {
                position.insert(model.id.clone(), models.len());
                models.push(model);
            }
        }
    }

    let mut shadowed = 0usize;
    for model in scraped_models {
        if position.contains_key(&model.id) {
            shadowed += 1;
            continue;
        }
        position.insert(model.id.clone(), models.len());
        models.push(model);
    }

    let mut seen: HashSet<RelationshipKey> = HashSet::new();
    let mut relationships = Vec::with_capacity(curated_rels.len() + scraped_rels.len());
    let mut duplicate_rels = 0usize;

    for rel in curated_rels.into_iter().chain(scraped_rels) {
        if seen.insert(rel.key()) {
            relationships.push(rel);
        } else {
            duplicate_rels += 1;
        }
    }

    debug!(
        curated_models = curated_count,
        scraped_models = scraped_count,
        shadowed_scraped = shadowed,
        duplicate_relationships = duplicate_rels,
        merged_models = models.len(),
        merged_relationships = relationships.len(),
        "Merged curated and scraped datasets"
    );

    (models, relationships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RelationType;

    fn ids(models: &[ModelRecord]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_curated_shadows_scraped_whole_record() {
        let curated = vec![ModelRecord::new("m1").with_name("Curated")];
        let scraped = vec![ModelRecord::new("m1")
            .with_name("Scraped")
            .with_company("ScrapeCo")];

        let (models, _) = merge(curated.clone(), vec![], scraped, vec![]);
        assert_eq!(models, curated);
        assert_eq!(models[0].company, None);
    }

    #[test]
    fn test_model_order_curated_then_unmatched_scraped() {
        let curated = vec![ModelRecord::new("c1"), ModelRecord::new("shared")];
        let scraped = vec![
            ModelRecord::new("s1"),
            ModelRecord::new("shared"),
            ModelRecord::new("s2"),
        ];
        let (models, _) = merge(curated, vec![], scraped, vec![]);
        assert_eq!(ids(&models), vec!["c1", "shared", "s1", "s2"]);
    }

    #[test]
    fn test_repeated_curated_id_keeps_position_takes_last() {
        let curated = vec![
            ModelRecord::new("a").with_name("first"),
            ModelRecord::new("b"),
            ModelRecord::new("a").with_name("second"),
        ];
        let (models, _) = merge(curated, vec![], vec![], vec![]);
        assert_eq!(ids(&models), vec!["a", "b"]);
        assert_eq!(models[0].name.as_deref(), Some("second"));
    }

    #[test]
    fn test_relationship_dedup_first_wins() {
        let curated_rels = vec![Relationship::new("a", "b", RelationType::Finetune)
            .with_source("curated")];
        let scraped_rels = vec![
            Relationship::new("a", "b", RelationType::Finetune)
                .with_source("huggingface-api")
                .with_confidence("silver"),
            Relationship::new("a", "b", RelationType::Quantization),
        ];

        let (_, rels) = merge(vec![], curated_rels, vec![], scraped_rels);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].source.as_deref(), Some("curated"));
        assert_eq!(rels[0].confidence, None);
        assert_eq!(rels[1].relation_type, RelationType::Quantization);
    }

    #[test]
    fn test_idempotent_with_empty_scraped() {
        let models = vec![ModelRecord::new("x"), ModelRecord::new("y")];
        let rels = vec![Relationship::new("x", "y", RelationType::Base)];
        let (m, r) = merge(models.clone(), rels.clone(), vec![], vec![]);
        assert_eq!(m, models);
        assert_eq!(r, rels);
    }

    #[test]
    fn test_dataset_merge_wrapper() {
        let curated = Dataset::new(vec![ModelRecord::new("gpt-base")], vec![]);
        let scraped = Dataset::new(
            vec![ModelRecord::new("gpt-ft")],
            vec![Relationship::new("gpt-base", "gpt-ft", RelationType::Finetune)],
        );
        let merged = Dataset::merge(curated, scraped);
        assert_eq!(merged.models.len(), 2);
        assert_eq!(merged.relationships.len(), 1);
    }
}
