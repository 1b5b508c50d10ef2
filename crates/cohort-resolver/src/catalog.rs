//! In-memory feature catalog.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CohortError, Result};
use crate::feature::{FamilyNaming, FeatureDescriptor};

/// On-disk JSON form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub features: Vec<FeatureDescriptor>,
}

/// A dependency naming a feature that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DanglingReference {
    pub feature: String,
    pub dependency: String,
}

/// Mapping from symbolic name to feature descriptor.
///
/// Keeps insertion order, so whole-catalog operations are deterministic.
/// The catalog is never mutated by resolution; share it by reference.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    features: IndexMap<String, Arc<FeatureDescriptor>>,
    /// lowercase short name -> symbolic name
    short_names: HashMap<String, String>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, failing on duplicate symbolic names.
    pub fn from_descriptors<I>(features: I) -> Result<Self>
    where
        I: IntoIterator<Item = FeatureDescriptor>,
    {
        let mut catalog = Self::new();
        for feature in features {
            catalog.insert(feature)?;
        }
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::from_descriptors(file.features)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            features: self.features.values().map(|f| f.as_ref().clone()).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Register a feature.
    ///
    /// A dependency on the feature itself is dropped.
    pub fn insert(&mut self, mut feature: FeatureDescriptor) -> Result<Arc<FeatureDescriptor>> {
        if self.features.contains_key(&feature.name) {
            return Err(CohortError::DuplicateFeature { name: feature.name });
        }

        if feature.content_features.shift_remove(&feature.name).is_some() {
            log::warn!("Feature {} lists itself as content; ignoring the self reference", feature.name);
        }

        if let Some(short_name) = &feature.short_name {
            let key = short_name.to_lowercase();
            match self.short_names.get(&key) {
                Some(owner) => log::warn!(
                    "Short name {} of {} is already used by {}",
                    short_name, feature.name, owner
                ),
                None => {
                    self.short_names.insert(key, feature.name.clone());
                }
            }
        }

        let feature = Arc::new(feature);
        self.features.insert(feature.name.clone(), feature.clone());
        Ok(feature)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FeatureDescriptor>> {
        self.features.get(name)
    }

    /// Look a feature up by its short name (case insensitive).
    pub fn get_by_short_name(&self, short_name: &str) -> Option<&Arc<FeatureDescriptor>> {
        self.short_names
            .get(&short_name.to_lowercase())
            .and_then(|name| self.features.get(name))
    }

    /// Symbolic name first, then short name.
    pub fn resolve(&self, name: &str) -> Option<&Arc<FeatureDescriptor>> {
        self.get(name).or_else(|| self.get_by_short_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FeatureDescriptor>> {
        self.features.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// All catalog members of a family, in catalog order.
    pub fn family_members<N: FamilyNaming>(&self, naming: &N, family: &str) -> Vec<&Arc<FeatureDescriptor>> {
        self.features
            .values()
            .filter(|f| naming.family(&f.name) == family)
            .collect()
    }

    /// Every dependency that does not resolve to a catalog entry.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for feature in self.features.values() {
            for (dependency, _) in feature.dependencies() {
                if !self.features.contains_key(dependency) {
                    dangling.push(DanglingReference {
                        feature: feature.name.clone(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::VersionSuffixNaming;

    #[test]
    fn test_insert_and_get() {
        let mut catalog = FeatureCatalog::new();
        catalog.insert(FeatureDescriptor::new("a-1.0")).unwrap();

        assert!(catalog.contains("a-1.0"));
        assert_eq!(catalog.get("a-1.0").unwrap().name, "a-1.0");
        assert!(catalog.get("a-2.0").is_none());
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = FeatureCatalog::new();
        catalog.insert(FeatureDescriptor::new("a-1.0")).unwrap();
        let err = catalog.insert(FeatureDescriptor::new("a-1.0")).unwrap_err();
        assert!(matches!(err, CohortError::DuplicateFeature { name } if name == "a-1.0"));
    }

    #[test]
    fn test_self_reference_dropped() {
        let mut catalog = FeatureCatalog::new();
        let feature = catalog
            .insert(FeatureDescriptor::new("a-1.0").with_dependency("a-1.0").with_dependency("b-1.0"))
            .unwrap();
        assert!(!feature.depends_on("a-1.0"));
        assert!(feature.depends_on("b-1.0"));
    }

    #[test]
    fn test_short_name_lookup() {
        let catalog = FeatureCatalog::from_descriptors([
            FeatureDescriptor::new("com.example.servlet-3.1").with_short_name("servlet-3.1"),
        ])
        .unwrap();

        assert_eq!(catalog.get_by_short_name("Servlet-3.1").unwrap().name, "com.example.servlet-3.1");
        assert_eq!(catalog.resolve("servlet-3.1").unwrap().name, "com.example.servlet-3.1");
        assert_eq!(catalog.resolve("com.example.servlet-3.1").unwrap().name, "com.example.servlet-3.1");
        assert!(catalog.resolve("servlet-4.0").is_none());
    }

    #[test]
    fn test_insertion_order() {
        let catalog = FeatureCatalog::from_descriptors([
            FeatureDescriptor::new("z-1.0"),
            FeatureDescriptor::new("a-1.0"),
            FeatureDescriptor::new("m-1.0"),
        ])
        .unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["z-1.0", "a-1.0", "m-1.0"]);
    }

    #[test]
    fn test_family_members() {
        let catalog = FeatureCatalog::from_descriptors([
            FeatureDescriptor::singleton("s-1.0"),
            FeatureDescriptor::new("t-1.0"),
            FeatureDescriptor::singleton("s-2.0"),
        ])
        .unwrap();
        let members: Vec<_> = catalog
            .family_members(&VersionSuffixNaming, "s")
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(members, vec!["s-1.0", "s-2.0"]);
    }

    #[test]
    fn test_dangling_references() {
        let catalog = FeatureCatalog::from_descriptors([
            FeatureDescriptor::new("a-1.0").with_dependency("b-1.0").with_dependency("missing-1.0"),
            FeatureDescriptor::new("b-1.0"),
        ])
        .unwrap();
        assert_eq!(
            catalog.dangling_references(),
            vec![DanglingReference { feature: "a-1.0".into(), dependency: "missing-1.0".into() }]
        );
    }

    #[test]
    fn test_json_round_trip_preserves_tolerance() {
        let json = r#"{
            "features": [
                { "name": "f-1.0", "visibility": "public",
                  "contentFeatures": { "s-1.0": "2.0" } },
                { "name": "s-1.0", "visibility": "public", "singleton": true },
                { "name": "s-2.0", "visibility": "public", "singleton": true }
            ]
        }"#;
        let catalog = FeatureCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("f-1.0").unwrap().content_features["s-1.0"], vec!["2.0"]);

        let reloaded = FeatureCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.get("f-1.0"), catalog.get("f-1.0"));
        assert!(reloaded.get("s-2.0").unwrap().singleton);
    }
}
