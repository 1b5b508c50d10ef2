//! Singleton-aware feature resolution.
//!
//! A [`FeatureCatalog`] is expanded root by root into
//! [`ResolvedConstrainedFeature`]s, each pairing a feature with the singleton
//! choices under which it was reached. [`bucket`] then merges those into
//! maximal [`ConstrainedFeatureSet`]s that can be installed together.
//!
//! ```
//! use cohort_resolver::{bucket, FeatureCatalog, FeatureDescriptor, Resolver, ResolverConfig};
//!
//! let catalog = FeatureCatalog::from_descriptors([
//!     FeatureDescriptor::new("feature-1.0").with_tolerating_dependency("singleton-1.0", ["2.0"]),
//!     FeatureDescriptor::singleton("singleton-1.0"),
//!     FeatureDescriptor::singleton("singleton-2.0"),
//! ])
//! .unwrap();
//!
//! let resolver = Resolver::new(&catalog, ResolverConfig::default());
//! let buckets = bucket(resolver.expand_all());
//! assert_eq!(buckets.len(), 2);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod feature;
pub mod loader;
pub mod manifest;
pub mod report;
pub mod resolver;

pub use catalog::{DanglingReference, FeatureCatalog};
pub use config::ResolverConfig;
pub use error::{CohortError, Result};
pub use feature::{FamilyNaming, FeatureDescriptor, VersionSuffixNaming, Visibility};
pub use loader::load_catalog;
pub use manifest::FeatureManifest;
pub use report::ResolutionReport;
pub use resolver::{
    bucket, bucket_with_report, expand, expand_all, expand_all_parallel, BucketReport, Choices,
    ConstrainedFeatureSet, Expander, PreferredPolicy, ResolvedConstrainedFeature, Resolver,
    SingletonChoice, SingletonSetId,
};
