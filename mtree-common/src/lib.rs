//! # mtree Common Library
//!
//! Shared code for the mtree pipeline binaries including:
//! - Model and relationship records with opaque model ids
//! - Curated/scraped merging with curated priority
//! - Lineage tree construction
//! - Structural validation (uniqueness, required fields, references, cycles, dates)
//! - Descriptive statistics
//! - JSON document loading/writing and data folder configuration
//! - Normalization of scraped catalog listings

pub mod config;
pub mod error;
pub mod ids;
pub mod loader;
pub mod merge;
pub mod records;
pub mod scraped;
pub mod stats;
pub mod tree;
pub mod validate;

pub use error::{Error, Result};
pub use ids::ModelId;
pub use merge::{merge, Dataset};
pub use records::{ModelRecord, RelationType, Relationship};
pub use tree::{build_tree, TreeError, TreeNode};
pub use validate::{
    validate, validate_post_merge, validate_pre_merge, ValidationReport, Validator,
};
