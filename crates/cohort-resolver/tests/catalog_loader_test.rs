//! Integration tests for loading catalogs from disk
//!
//! These tests build small catalogs out of manifests and JSON files in a
//! temporary directory and resolve them end to end.

use cohort_resolver::{bucket, load_catalog, CohortError, Resolver, ResolverConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const FEATURE: &str = "\
Subsystem-SymbolicName: feature-1.0; visibility:=public
Subsystem-Content: singleton-1.0; type=\"osgi.subsystem.feature\"; ibm.tolerates:=2.0,
 com.example.bundle; version=\"[1,2)\"
";

const SINGLETON_1: &str = "\
Subsystem-SymbolicName: singleton-1.0; visibility:=public; singleton:=true
IBM-ShortName: singleton-1.0
";

const SINGLETON_2: &str = "\
Subsystem-SymbolicName: singleton-2.0; visibility:=public; singleton:=true
";

#[test]
fn test_load_manifest_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "features/feature-1.0.mf", FEATURE);
    write(temp_dir.path(), "features/singletons/singleton-1.0.mf", SINGLETON_1);
    write(temp_dir.path(), "features/singletons/singleton-2.0.mf", SINGLETON_2);
    write(temp_dir.path(), "features/README.md", "not a manifest");

    let catalog = load_catalog(&temp_dir.path().join("features"), &ResolverConfig::default()).unwrap();

    assert_eq!(catalog.len(), 3);
    let feature = catalog.get("feature-1.0").unwrap();
    assert_eq!(feature.content_features["singleton-1.0"], vec!["2.0"]);
    assert!(catalog.get("singleton-2.0").unwrap().singleton);

    let resolver = Resolver::new(&catalog, ResolverConfig::default());
    assert_eq!(bucket(resolver.expand_all()).len(), 2);
}

#[test]
fn test_load_single_manifest() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "singleton-1.0.mf", SINGLETON_1);

    let catalog = load_catalog(&temp_dir.path().join("singleton-1.0.mf"), &ResolverConfig::default()).unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["singleton-1.0"]);
}

#[test]
fn test_load_json_catalog() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "catalog.json",
        r#"{"features": [
            {"name": "a-1.0", "visibility": "public", "contentFeatures": {"s-1.0": null}},
            {"name": "s-1.0", "visibility": "public", "singleton": true}
        ]}"#,
    );

    let catalog = load_catalog(&temp_dir.path().join("catalog.json"), &ResolverConfig::default()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("a-1.0").unwrap().depends_on("s-1.0"));
}

#[test]
fn test_duplicate_definitions_keep_first() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a/singleton-1.0.mf", SINGLETON_1);
    write(
        temp_dir.path(),
        "b/singleton-1.0.mf",
        "Subsystem-SymbolicName: singleton-1.0; visibility:=private\n",
    );

    let catalog = load_catalog(temp_dir.path(), &ResolverConfig::default()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get("singleton-1.0").unwrap().is_public());
}

#[test]
fn test_extensions_filter_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "singleton-1.0.mf", SINGLETON_1);
    write(temp_dir.path(), "extra.json", r#"{"features": [{"name": "x-1.0"}]}"#);

    let config = ResolverConfig {
        manifest_extensions: vec!["mf".to_string()],
        ..ResolverConfig::default()
    };
    let catalog = load_catalog(temp_dir.path(), &config).unwrap();
    assert!(!catalog.contains("x-1.0"));
    assert!(catalog.contains("singleton-1.0"));
}

#[test]
fn test_missing_path() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_catalog(&temp_dir.path().join("nope"), &ResolverConfig::default()).unwrap_err();
    assert!(matches!(err, CohortError::CatalogNotFound { .. }));
}

#[test]
fn test_invalid_manifest_reports_origin() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "broken.mf", "IBM-ShortName: broken\n");

    let err = load_catalog(temp_dir.path(), &ResolverConfig::default()).unwrap_err();
    match err {
        CohortError::InvalidManifest { origin, .. } => assert!(origin.ends_with("broken.mf")),
        other => panic!("unexpected error: {}", other),
    }
}
