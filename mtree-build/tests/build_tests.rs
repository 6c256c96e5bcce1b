//! Integration tests for the build pipeline on a temporary data folder

use mtree_build::{import_listing, run_build, BuildError, BuildOptions};
use mtree_common::config::DataLayout;
use mtree_common::loader::load_scraped_file;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, value: Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn options(root: &Path) -> BuildOptions {
    BuildOptions {
        layout: DataLayout::new(root),
        skip_validation: false,
        import_listing: None,
    }
}

#[test]
fn test_build_writes_merged_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());

    write(
        &layout.curated_dir.join("openai.json"),
        json!({"models": [{"id": "gpt-base", "name": "GPT Base", "company": "OpenAI"}]}),
    );
    write(
        &layout.scraped_file,
        json!({
            "scraped_at": "2025-01-01T00:00:00Z",
            "total_models": 2,
            "total_relationships": 1,
            "models": [
                {"id": "gpt-base", "name": "scraped copy", "company": "unknown"},
                {"id": "gpt-ft", "name": "gpt-ft", "company": "someone"}
            ],
            "relationships": [
                {"parent": "gpt-base", "child": "gpt-ft", "type": "finetune",
                 "source": "huggingface-api", "confidence": "silver"}
            ]
        }),
    );

    let summary = run_build(&options(temp_dir.path())).unwrap();
    assert_eq!(summary.models, 2);
    assert_eq!(summary.relationships, 1);
    assert_eq!(summary.roots, 1);
    assert_eq!(summary.tree_nodes, 2);
    assert_eq!(summary.written.len(), 4);

    let models = read(&temp_dir.path().join("models.json"));
    assert_eq!(models[0]["name"], "GPT Base");

    let tree = read(&temp_dir.path().join("tree.json"));
    assert_eq!(tree["id"], "__root__");
    assert_eq!(tree["children"][0]["children"][0]["id"], "gpt-ft");
    assert_eq!(tree["children"][0]["children"][0]["_relType"], "finetune");

    let stats = read(&temp_dir.path().join("stats.json"));
    assert_eq!(stats["totalModels"], 2);
    assert_eq!(stats["companies"]["OpenAI"], 1);
}

#[test]
fn test_build_refuses_invalid_data() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    write(
        &layout.curated_dir.join("dup.json"),
        json!({"models": [
            {"id": "m1", "name": "One", "company": "Co"},
            {"id": "m1", "name": "One again", "company": "Co"}
        ]}),
    );

    match run_build(&options(temp_dir.path())) {
        Err(BuildError::ValidationFailed(report)) => {
            assert_eq!(report.errors, vec!["Duplicate model ID: m1".to_string()]);
        }
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
    assert!(!temp_dir.path().join("tree.json").exists());
}

#[test]
fn test_skip_validation_still_stops_on_rooted_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    write(
        &layout.curated_dir.join("loop.json"),
        json!({
            "models": [
                {"id": "r", "name": "R", "company": "Co"},
                {"id": "x", "name": "X", "company": "Co"},
                {"id": "y", "name": "Y", "company": "Co"}
            ],
            "relationships": [
                {"parent": "r", "child": "x", "type": "base"},
                {"parent": "x", "child": "y", "type": "base"},
                {"parent": "y", "child": "x", "type": "merge"}
            ]
        }),
    );

    let mut opts = options(temp_dir.path());
    opts.skip_validation = true;
    let err = run_build(&opts).unwrap_err();
    assert!(err.to_string().contains("Cycle"), "{err}");
}

#[test]
fn test_import_listing_then_build() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    write(
        &layout.curated_dir.join("meta.json"),
        json!({"models": [{"id": "meta/llama", "name": "Llama", "company": "Meta"}]}),
    );
    let listing = temp_dir.path().join("listing.json");
    write(
        &listing,
        json!([
            {"id": "someone/llama-gguf", "author": "someone",
             "tags": ["base_model:quantized:meta/llama"]},
            {"id": "meta/llama", "author": "meta-llama"}
        ]),
    );

    assert_eq!(import_listing(&listing, &layout.scraped_file).unwrap(), 2);
    let scraped = load_scraped_file(&layout.scraped_file).unwrap();
    assert_eq!(scraped.total_relationships, Some(1));

    let summary = run_build(&options(temp_dir.path())).unwrap();
    assert_eq!(summary.models, 2);
    assert_eq!(summary.roots, 1);

    let tree = read(&temp_dir.path().join("tree.json"));
    let llama = &tree["children"][0];
    assert_eq!(llama["name"], "Llama");
    assert_eq!(llama["children"][0]["_relType"], "quantization");
}

#[test]
fn test_missing_curated_dir_fails() {
    let temp_dir = TempDir::new().unwrap();
    let err = run_build(&options(temp_dir.path())).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Common(mtree_common::Error::NotFound(_))
    ));
}
