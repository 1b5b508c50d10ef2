//! Runs the `cohort` binary against catalogs in a temporary directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CATALOG: &str = r#"{"features": [
    {"name": "feature-1.0", "visibility": "public", "contentFeatures": {"singleton-1.0": "2.0"}},
    {"name": "singleton-1.0", "visibility": "public", "singleton": true},
    {"name": "singleton-2.0", "visibility": "public", "singleton": true}
]}"#;

fn cohort(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cohort"))
        .args(args)
        .arg("-d")
        .arg(dir)
        .env_remove("COHORT_CATALOG")
        .env_remove("COHORT_PARALLEL")
        .env_remove("COHORT_PREFERRED_POLICY")
        .output()
        .unwrap()
}

fn project(catalog: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("catalog.json"), catalog).unwrap();
    fs::write(dir.path().join("cohort.toml"), "catalog = \"catalog.json\"\n").unwrap();
    dir
}

#[test]
fn test_buckets_json() {
    let dir = project(CATALOG);
    let out = cohort(dir.path(), &["buckets", "--format", "json"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["buckets"].as_array().unwrap().len(), 2);
    assert_eq!(json["unplaced"].as_array().unwrap().len(), 2);
}

#[test]
fn test_expand_json_lists_both_branches() {
    let dir = project(CATALOG);
    let out = cohort(dir.path(), &["expand", "feature-1.0", "--format", "json"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let roots: Vec<&serde_json::Value> = json
        .as_array()
        .unwrap()
        .iter()
        .filter(|rcf| rcf["feature"] == "feature-1.0")
        .collect();
    assert_eq!(roots.len(), 2);
}

#[test]
fn test_expand_unknown_feature_fails() {
    let dir = project(CATALOG);
    let out = cohort(dir.path(), &["expand", "missing-1.0"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Feature not found: missing-1.0"));
}

#[test]
fn test_verify_flags_dangling_reference() {
    let dir = project(
        r#"{"features": [{"name": "a-1.0", "visibility": "public", "contentFeatures": {"gone-1.0": null}}]}"#,
    );
    let out = cohort(dir.path(), &["verify"]);
    assert_eq!(out.status.code(), Some(1));

    let clean = project(CATALOG);
    assert_eq!(cohort(clean.path(), &["verify"]).status.code(), Some(0));
}

#[test]
fn test_missing_catalog_setting() {
    let dir = TempDir::new().unwrap();
    let out = cohort(dir.path(), &["verify"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No catalog given"));
}
