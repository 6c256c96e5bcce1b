//! mtree-validate library - data integrity checks for the curated set
//!
//! By default validates curated data on its own, before any merge. With
//! `merged` set, validates curated + scraped after merging, i.e. exactly what
//! mtree-build would publish.

use mtree_common::config::DataLayout;
use mtree_common::loader::{load_curated_dir, load_scraped_file};
use mtree_common::validate::CheckSummary;
use mtree_common::{
    validate, validate_post_merge, validate_pre_merge, Dataset, Result, ValidationReport,
};
use std::fmt::Write;
use tracing::info;

/// Default number of warnings printed before truncating
pub const DEFAULT_MAX_WARNINGS: usize = 10;

/// Load the dataset to validate
pub fn load_dataset(layout: &DataLayout, merged: bool) -> Result<Dataset> {
    let curated = load_curated_dir(&layout.curated_dir)?;
    if !merged {
        return Ok(curated);
    }
    let scraped = load_scraped_file(&layout.scraped_file)?;
    Ok(Dataset::merge(curated, scraped.dataset))
}

/// Load and validate
///
/// In merged mode duplicate ids are checked on the curated input, since the
/// merge keeps only one record per id.
pub fn run_validation(layout: &DataLayout, merged: bool) -> Result<(Dataset, ValidationReport)> {
    let curated = load_curated_dir(&layout.curated_dir)?;
    let (dataset, report) = if merged {
        let scraped = load_scraped_file(&layout.scraped_file)?;
        let mut report = validate_pre_merge(&curated.models);
        let dataset = Dataset::merge(curated, scraped.dataset);
        report.extend(validate_post_merge(&dataset.models, &dataset.relationships));
        (dataset, report)
    } else {
        let report = validate(&curated.models, &curated.relationships);
        (curated, report)
    };

    info!(
        models = dataset.models.len(),
        relationships = dataset.relationships.len(),
        merged,
        errors = report.errors.len(),
        "Validated data"
    );
    Ok((dataset, report))
}

fn check_title(name: &str) -> &str {
    match name {
        "duplicate_ids" => "Checking duplicate IDs",
        "required_fields" => "Checking required fields",
        "relationship_refs" => "Checking relationship references",
        "cycles" => "Checking for cycles",
        "release_dates" => "Checking dates",
        other => other,
    }
}

fn check_line(index: usize, check: &CheckSummary) -> String {
    let mut line = format!("{}. {}...\n   ", index + 1, check_title(check.name));
    if check.errors > 0 {
        line.push_str(&format!("FAIL ({} errors)", check.errors));
    } else {
        line.push_str("PASS");
    }
    if check.warnings > 0 {
        line.push_str(&format!(" ({} warnings)", check.warnings));
    }
    line
}

/// Render the console report
///
/// Lists every check, then all errors, then at most `max_warnings` warnings.
pub fn render_report(report: &ValidationReport, max_warnings: usize) -> String {
    let mut out = String::new();

    for (i, check) in report.checks.iter().enumerate() {
        let _ = writeln!(out, "{}", check_line(i, check));
    }
    let _ = writeln!(out, "\n{}", "=".repeat(50));

    if report.passed() {
        let _ = writeln!(out, "\nVALIDATION PASSED");
    } else {
        let _ = writeln!(out, "\nVALIDATION FAILED: {} error(s)\n", report.errors.len());
        for e in &report.errors {
            let _ = writeln!(out, "  ERROR: {}", e);
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "   ({} warnings)", report.warnings.len());
        for w in report.warnings.iter().take(max_warnings) {
            let _ = writeln!(out, "   WARN: {}", w);
        }
        if report.warnings.len() > max_warnings {
            let _ = writeln!(out, "   ... and {} more", report.warnings.len() - max_warnings);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(errors: &[&str], warnings: &[&str]) -> ValidationReport {
        ValidationReport {
            errors: errors.iter().map(|s| s.to_string()).collect(),
            warnings: warnings.iter().map(|s| s.to_string()).collect(),
            checks: vec![
                CheckSummary {
                    name: "duplicate_ids",
                    errors: errors.len(),
                    warnings: 0,
                },
                CheckSummary {
                    name: "relationship_refs",
                    errors: 0,
                    warnings: warnings.len(),
                },
            ],
        }
    }

    #[test]
    fn test_render_pass() {
        let text = render_report(&report(&[], &[]), DEFAULT_MAX_WARNINGS);
        assert!(text.contains("1. Checking duplicate IDs...\n   PASS"));
        assert!(text.contains("VALIDATION PASSED"));
        assert!(!text.contains("WARN"));
    }

    #[test]
    fn test_render_fail_lists_errors() {
        let text = render_report(&report(&["Duplicate model ID: m1"], &[]), 10);
        assert!(text.contains("FAIL (1 errors)"));
        assert!(text.contains("VALIDATION FAILED: 1 error(s)"));
        assert!(text.contains("  ERROR: Duplicate model ID: m1"));
    }

    #[test]
    fn test_render_truncates_warnings() {
        let warnings = ["w1", "w2", "w3", "w4"];
        let text = render_report(&report(&[], &warnings), 2);
        assert!(text.contains("2. Checking relationship references...\n   PASS (4 warnings)"));
        assert!(text.contains("WARN: w1"));
        assert!(text.contains("WARN: w2"));
        assert!(!text.contains("WARN: w3"));
        assert!(text.contains("... and 2 more"));
    }
}
