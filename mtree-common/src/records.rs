//! Model and relationship records
//!
//! Records are deserialized straight from curated and scraped JSON documents.
//! Known fields are typed; everything else lands in an ordered attribute bag
//! and is written back out untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::ids::ModelId;

/// Sentinel used when `company` or `modality` is absent
pub const UNKNOWN: &str = "unknown";

/// Confidence tier attached to inferred (scraped) relationships
pub const CONFIDENCE_SILVER: &str = "silver";

/// One AI model release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: ModelId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Display alias preferred over `name` in the tree view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,

    /// `YYYY-MM-DD` prefix expected, not enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    /// Source-specific attributes (tags, architecture, downloads, likes, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ModelRecord {
    pub fn new(id: impl Into<ModelId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            short_name: None,
            company: None,
            modality: None,
            release_date: None,
            attributes: Map::new(),
        }
    }

    /// Builder-style setters, mostly for fixtures and the scraped normalizer
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = Some(modality.into());
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Display name: shortName, then name, then id
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }

    pub fn company_or_unknown(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn modality_or_unknown(&self) -> &str {
        self.modality.as_deref().unwrap_or(UNKNOWN)
    }

    /// First four characters of a non-empty release date
    pub fn release_year(&self) -> Option<&str> {
        let date = self.release_date.as_deref().filter(|d| !d.is_empty())?;
        Some(date.get(..4).unwrap_or(date))
    }
}

/// Derivation edge classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Base,
    Finetune,
    Quantization,
    Adapter,
    Merge,
}

impl RelationType {
    pub const ALL: [RelationType; 5] = [
        RelationType::Base,
        RelationType::Finetune,
        RelationType::Quantization,
        RelationType::Adapter,
        RelationType::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Base => "base",
            RelationType::Finetune => "finetune",
            RelationType::Quantization => "quantization",
            RelationType::Adapter => "adapter",
            RelationType::Merge => "merge",
        }
    }

    /// Parse a catalog tag segment (`finetune`, `quantized`, `adapter`, ...)
    ///
    /// Case and surrounding whitespace are ignored. `quantized` maps to
    /// `Quantization`; anything unrecognized falls back to `Base`.
    pub fn from_catalog_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "finetune" => RelationType::Finetune,
            "quantized" | "quantization" => RelationType::Quantization,
            "adapter" => RelationType::Adapter,
            "merge" => RelationType::Merge,
            _ => RelationType::Base,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed derivation edge `parent -> child`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub parent: ModelId,
    pub child: ModelId,

    #[serde(rename = "type")]
    pub relation_type: RelationType,

    /// Provenance tag (which collaborator produced the edge)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Trust tier, e.g. `"silver"` for inferred edges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Deduplication identity of a relationship: `(parent, child, type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    pub parent: ModelId,
    pub child: ModelId,
    pub relation_type: RelationType,
}

impl Relationship {
    pub fn new(
        parent: impl Into<ModelId>,
        child: impl Into<ModelId>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            relation_type,
            source: None,
            confidence: None,
            attributes: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey {
            parent: self.parent.clone(),
            child: self.child.clone(),
            relation_type: self.relation_type,
        }
    }
}
