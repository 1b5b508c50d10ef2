//! Building a [`FeatureCatalog`] from files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::{CatalogFile, FeatureCatalog};
use crate::config::ResolverConfig;
use crate::error::{CohortError, Result};
use crate::feature::FeatureDescriptor;
use crate::manifest::FeatureManifest;

/// Load a catalog from a JSON catalog file, a single manifest, or a
/// directory of either.
///
/// Directories are walked recursively in sorted path order. When a feature
/// is defined more than once the first definition wins and the rest are
/// logged.
pub fn load_catalog(path: &Path, config: &ResolverConfig) -> Result<FeatureCatalog> {
    if !path.exists() {
        return Err(CohortError::CatalogNotFound { path: path.to_path_buf() });
    }

    let files = if path.is_dir() {
        catalog_files(path, config)
    } else {
        vec![path.to_path_buf()]
    };

    let mut catalog = FeatureCatalog::new();
    for file in &files {
        for feature in read_features(file)? {
            match catalog.insert(feature) {
                Ok(_) => {}
                Err(CohortError::DuplicateFeature { name }) => {
                    log::warn!("Ignoring second definition of {} in {}", name, file.display());
                }
                Err(e) => return Err(e),
            }
        }
    }

    log::info!(
        "Loaded {} features from {} files under {}",
        catalog.len(),
        files.len(),
        path.display()
    );
    Ok(catalog)
}

fn catalog_files(dir: &Path, config: &ResolverConfig) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable catalog entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && config.is_manifest_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn read_features(path: &Path) -> Result<Vec<FeatureDescriptor>> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        log::debug!("Reading catalog file {}", path.display());
        let content = fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Ok(file.features)
    } else {
        log::debug!("Reading manifest {}", path.display());
        Ok(vec![FeatureManifest::read(path)?.to_descriptor()?])
    }
}
