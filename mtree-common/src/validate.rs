//! Structural validation of the model/relationship graph
//!
//! Runs a fixed set of independent checks and unions their findings into
//! errors (fatal, block publication) and warnings (informational only).
//!
//! # Checks
//! 1. **duplicate_ids** - every model id occurs once (error per repeat)
//! 2. **required_fields** - `id`, `name`, `company` non-empty (error per field)
//! 3. **relationship_refs** - parent/child name an existing model (warning per reference)
//! 4. **cycles** - relationship graph is acyclic (error per back-edge)
//! 5. **release_dates** - `releaseDate` looks like `YYYY-MM-DD` (warning)
//!
//! Dangling references are warnings on purpose: the curated set may point at
//! models that are only present after merging with scraped data.
//!
//! # Validating a merge
//! Merging keeps one record per id, so repeated curated ids are gone from the
//! merged set. [`validate_pre_merge`] runs `duplicate_ids` on the curated input
//! and [`validate_post_merge`] runs the other four checks on the merged output.
//!
//! # Example
//! ```
//! use mtree_common::{validate, ModelRecord};
//!
//! let models = vec![ModelRecord::new("m1"), ModelRecord::new("m1")];
//! let report = validate(&models, &[]);
//! assert!(!report.passed());
//! assert!(report.errors.iter().any(|e| e == "Duplicate model ID: m1"));
//! ```

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::ids::ModelId;
use crate::records::{ModelRecord, Relationship};

/// Findings of a single check
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// One structural check over the full model/relationship collections
pub trait Check {
    /// Check name for reporting
    fn name(&self) -> &'static str;

    fn run(&self, models: &[ModelRecord], relationships: &[Relationship]) -> CheckOutcome;
}

/// Per-check counts, in run order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    pub name: &'static str,
    pub errors: usize,
    pub warnings: usize,
}

/// Aggregated validation result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub checks: Vec<CheckSummary>,
}

impl ValidationReport {
    /// True iff no errors were found; warnings never fail validation
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append the findings and check summaries of a later run
    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.checks.extend(other.checks);
    }
}

/// Ordered collection of checks
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    /// Validator running all five standard checks
    pub fn new() -> Self {
        Self::with_checks(vec![
            Box::new(DuplicateIds),
            Box::new(RequiredFields),
            Box::new(RelationshipRefs),
            Box::new(Cycles),
            Box::new(ReleaseDates),
        ])
    }

    pub fn with_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Run every check and union the results. Never short-circuits.
    pub fn validate(
        &self,
        models: &[ModelRecord],
        relationships: &[Relationship],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        for check in &self.checks {
            let outcome = check.run(models, relationships);
            debug!(
                check = check.name(),
                errors = outcome.errors.len(),
                warnings = outcome.warnings.len(),
                "Validation check complete"
            );
            report.checks.push(CheckSummary {
                name: check.name(),
                errors: outcome.errors.len(),
                warnings: outcome.warnings.len(),
            });
            report.errors.extend(outcome.errors);
            report.warnings.extend(outcome.warnings);
        }

        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate with the standard checks
pub fn validate(models: &[ModelRecord], relationships: &[Relationship]) -> ValidationReport {
    Validator::new().validate(models, relationships)
}

/// Duplicate-id check over curated models, before merging collapses repeats
pub fn validate_pre_merge(curated_models: &[ModelRecord]) -> ValidationReport {
    Validator::with_checks(vec![Box::new(DuplicateIds)]).validate(curated_models, &[])
}

/// Remaining standard checks over the merged collections
pub fn validate_post_merge(
    models: &[ModelRecord],
    relationships: &[Relationship],
) -> ValidationReport {
    Validator::with_checks(vec![
        Box::new(RequiredFields),
        Box::new(RelationshipRefs),
        Box::new(Cycles),
        Box::new(ReleaseDates),
    ])
    .validate(models, relationships)
}

/// Every model id must occur exactly once
pub struct DuplicateIds;

impl Check for DuplicateIds {
    fn name(&self) -> &'static str {
        "duplicate_ids"
    }

    fn run(&self, models: &[ModelRecord], _relationships: &[Relationship]) -> CheckOutcome {
        let mut seen = HashSet::new();
        let errors = models
            .iter()
            .filter(|m| !seen.insert(&m.id))
            .map(|m| format!("Duplicate model ID: {}", m.id))
            .collect();
        CheckOutcome {
            errors,
            warnings: Vec::new(),
        }
    }
}

/// `id`, `name` and `company` must be present and non-empty
pub struct RequiredFields;

impl Check for RequiredFields {
    fn name(&self) -> &'static str {
        "required_fields"
    }

    fn run(&self, models: &[ModelRecord], _relationships: &[Relationship]) -> CheckOutcome {
        let mut errors = Vec::new();

        for model in models {
            let label = if model.id.is_empty() { "?" } else { model.id.as_str() };
            let fields = [
                ("id", !model.id.is_empty()),
                ("name", is_filled(&model.name)),
                ("company", is_filled(&model.company)),
            ];
            for (field, present) in fields {
                if !present {
                    errors.push(format!("Model {} missing required field: {}", label, field));
                }
            }
        }

        CheckOutcome {
            errors,
            warnings: Vec::new(),
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Relationship endpoints should name existing models
pub struct RelationshipRefs;

impl Check for RelationshipRefs {
    fn name(&self) -> &'static str {
        "relationship_refs"
    }

    fn run(&self, models: &[ModelRecord], relationships: &[Relationship]) -> CheckOutcome {
        let model_ids: HashSet<&ModelId> = models.iter().map(|m| &m.id).collect();
        let mut warnings = Vec::new();

        for rel in relationships {
            if !model_ids.contains(&rel.parent) {
                warnings.push(format!(
                    "Relationship parent '{}' not in models (child: {})",
                    rel.parent, rel.child
                ));
            }
            if !model_ids.contains(&rel.child) {
                warnings.push(format!(
                    "Relationship child '{}' not in models (parent: {})",
                    rel.child, rel.parent
                ));
            }
        }

        CheckOutcome {
            errors: Vec::new(),
            warnings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current DFS path
    Gray,
    /// Fully explored
    Black,
}

/// The relationship graph must be a DAG
///
/// Three-colour depth-first search over every id that appears in a
/// relationship (absent from the colour map = white). An edge into a gray
/// node is a back-edge and is reported as `node -> child`. Search continues
/// after a back-edge and restarts from every remaining white node, so each
/// independent cycle is reported. Parallel edges between the same pair (e.g.
/// a `base` and a `finetune` edge) are followed once.
pub struct Cycles;

impl Check for Cycles {
    fn name(&self) -> &'static str {
        "cycles"
    }

    fn run(&self, _models: &[ModelRecord], relationships: &[Relationship]) -> CheckOutcome {
        let mut nodes: Vec<&ModelId> = Vec::new();
        let mut known: HashSet<&ModelId> = HashSet::new();
        let mut adjacency: HashMap<&ModelId, Vec<&ModelId>> = HashMap::new();
        let mut edges: HashSet<(&ModelId, &ModelId)> = HashSet::new();

        for rel in relationships {
            for id in [&rel.parent, &rel.child] {
                if known.insert(id) {
                    nodes.push(id);
                }
            }
            if edges.insert((&rel.parent, &rel.child)) {
                adjacency.entry(&rel.parent).or_default().push(&rel.child);
            }
        }

        let mut color: HashMap<&ModelId, Color> = HashMap::with_capacity(nodes.len());
        let mut errors = Vec::new();

        for start in nodes {
            if color.contains_key(start) {
                continue;
            }

            color.insert(start, Color::Gray);
            let mut stack: Vec<(&ModelId, usize)> = vec![(start, 0)];

            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                let child = adjacency.get(node).and_then(|c| c.get(*next)).copied();

                match child {
                    Some(child) => {
                        *next += 1;
                        match color.get(child) {
                            Some(Color::Gray) => {
                                errors.push(format!("Cycle detected involving: {} -> {}", node, child));
                            }
                            Some(Color::Black) => {}
                            None => {
                                color.insert(child, Color::Gray);
                                stack.push((child, 0));
                            }
                        }
                    }
                    None => {
                        color.insert(node, Color::Black);
                        stack.pop();
                    }
                }
            }
        }

        CheckOutcome {
            errors,
            warnings: Vec::new(),
        }
    }
}

/// `releaseDate`, when present, should have at least three dash-separated parts
pub struct ReleaseDates;

impl Check for ReleaseDates {
    fn name(&self) -> &'static str {
        "release_dates"
    }

    fn run(&self, models: &[ModelRecord], _relationships: &[Relationship]) -> CheckOutcome {
        let warnings = models
            .iter()
            .filter_map(|m| {
                let date = m.release_date.as_deref().filter(|d| !d.is_empty())?;
                (date.split('-').count() < 3)
                    .then(|| format!("Invalid date format for {}: {}", m.id, date))
            })
            .collect();

        CheckOutcome {
            errors: Vec::new(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RelationType;

    fn valid(id: &str) -> ModelRecord {
        ModelRecord::new(id).with_name(id).with_company("Acme")
    }

    fn base(parent: &str, child: &str) -> Relationship {
        Relationship::new(parent, child, RelationType::Base)
    }

    fn cycle_errors(report: &ValidationReport) -> Vec<&String> {
        report.errors.iter().filter(|e| e.contains("Cycle")).collect()
    }

    #[test]
    fn test_clean_dataset_passes() {
        let models = vec![valid("a"), valid("b").with_release_date("2024-03-01")];
        let report = validate(&models, &[base("a", "b")]);
        assert!(report.passed());
        assert!(report.warnings.is_empty());
        assert_eq!(report.checks.len(), 5);
    }

    #[test]
    fn test_single_duplicate_error() {
        let report = validate(&[valid("m1"), valid("m1")], &[]);
        assert_eq!(report.errors, vec!["Duplicate model ID: m1".to_string()]);
    }

    #[test]
    fn test_triplicate_gives_two_errors() {
        let outcome = DuplicateIds.run(&[valid("x"), valid("x"), valid("x")], &[]);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn test_required_fields_each_counted() {
        let mut blank_company = valid("c");
        blank_company.company = Some(String::new());
        let models = vec![ModelRecord::new(""), blank_company];

        let outcome = RequiredFields.run(&models, &[]);
        assert_eq!(
            outcome.errors,
            vec![
                "Model ? missing required field: id".to_string(),
                "Model ? missing required field: name".to_string(),
                "Model ? missing required field: company".to_string(),
                "Model c missing required field: company".to_string(),
            ]
        );
    }

    #[test]
    fn test_dangling_parent_is_warning_only() {
        let report = validate(&[valid("child")], &[base("missing", "child")]);
        assert!(report.passed());
        assert_eq!(
            report.warnings,
            vec!["Relationship parent 'missing' not in models (child: child)".to_string()]
        );
    }

    #[test]
    fn test_dangling_both_ends() {
        let outcome = RelationshipRefs.run(&[], &[base("p", "c")]);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_three_cycle_detected() {
        let models = vec![valid("A"), valid("B"), valid("C")];
        let rels = vec![base("A", "B"), base("B", "C"), base("C", "A")];
        let report = validate(&models, &rels);
        assert!(!report.passed());
        assert_eq!(cycle_errors(&report), vec!["Cycle detected involving: C -> A"]);
    }

    #[test]
    fn test_chain_without_closing_edge_has_no_cycle() {
        let models = vec![valid("A"), valid("B"), valid("C")];
        let rels = vec![base("A", "B"), base("B", "C")];
        let report = validate(&models, &rels);
        assert!(cycle_errors(&report).is_empty());
        assert!(report.passed());
    }

    #[test]
    fn test_independent_cycles_each_reported() {
        let rels = vec![
            base("a", "b"),
            base("b", "a"),
            base("x", "y"),
            base("y", "z"),
            base("z", "x"),
        ];
        let outcome = Cycles.run(&[], &rels);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors.iter().any(|e| e.ends_with("b -> a")));
        assert!(outcome.errors.iter().any(|e| e.ends_with("z -> x")));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let outcome = Cycles.run(&[], &[base("s", "s")]);
        assert_eq!(outcome.errors, vec!["Cycle detected involving: s -> s".to_string()]);
    }

    #[test]
    fn test_diamond_is_not_cycle() {
        let rels = vec![base("a", "b"), base("a", "c"), base("b", "d"), base("c", "d")];
        assert!(Cycles.run(&[], &rels).errors.is_empty());
    }

    #[test]
    fn test_parallel_edges_reported_once() {
        let rels = vec![
            base("a", "b"),
            base("b", "a"),
            Relationship::new("b", "a", RelationType::Finetune),
        ];
        assert_eq!(Cycles.run(&[], &rels).errors.len(), 1);
    }

    #[test]
    fn test_release_date_warnings() {
        let models = vec![
            valid("ok").with_release_date("2023-07-18"),
            valid("month").with_release_date("2023-07"),
            valid("empty").with_release_date(""),
            valid("none"),
        ];
        let outcome = ReleaseDates.run(&models, &[]);
        assert_eq!(
            outcome.warnings,
            vec!["Invalid date format for month: 2023-07".to_string()]
        );
    }

    #[test]
    fn test_all_checks_unioned() {
        let models = vec![
            valid("dup"),
            valid("dup").with_release_date("2020"),
            ModelRecord::new("nameless").with_company("X"),
        ];
        let rels = vec![base("dup", "ghost"), base("nameless", "nameless")];
        let report = validate(&models, &rels);

        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.warnings.len(), 2);
        let counts: Vec<_> = report
            .checks
            .iter()
            .map(|c| (c.name, c.errors, c.warnings))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("duplicate_ids", 1, 0),
                ("required_fields", 1, 0),
                ("relationship_refs", 0, 1),
                ("cycles", 1, 0),
                ("release_dates", 0, 1),
            ]
        );
    }

    #[test]
    fn test_pre_merge_duplicates_survive_merge() {
        let curated = vec![valid("m1"), valid("m1").with_name("again"), valid("m2")];
        let scraped = vec![ModelRecord::new("m2").with_name("scraped")];

        let mut report = validate_pre_merge(&curated);
        let (models, rels) = crate::merge::merge(curated, Vec::new(), scraped, Vec::new());
        assert_eq!(models.len(), 2);
        report.extend(validate_post_merge(&models, &rels));

        assert_eq!(report.errors, vec!["Duplicate model ID: m1".to_string()]);
        let names: Vec<_> = report.checks.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "duplicate_ids",
                "required_fields",
                "relationship_refs",
                "cycles",
                "release_dates"
            ]
        );
    }

    #[test]
    fn test_custom_check_set() {
        let validator = Validator::with_checks(vec![Box::new(ReleaseDates)]);
        let report = validator.validate(&[valid("a"), valid("a")], &[]);
        assert!(report.passed());
        assert_eq!(report.checks.len(), 1);
    }
}
