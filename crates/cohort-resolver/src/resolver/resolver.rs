use std::collections::BTreeSet;

use super::bucketing::{bucket_with_report, BucketReport};
use super::constrained::ResolvedConstrainedFeature;
use super::expansion::Expander;
use crate::catalog::FeatureCatalog;
use crate::config::ResolverConfig;
use crate::error::{CohortError, Result};
use crate::feature::{FamilyNaming, VersionSuffixNaming};
use crate::report::ResolutionReport;

/// Catalog, naming and configuration bundled for the common entry points.
pub struct Resolver<'a, N: FamilyNaming = VersionSuffixNaming> {
    catalog: &'a FeatureCatalog,
    naming: N,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a FeatureCatalog, config: ResolverConfig) -> Self {
        Self::with_naming(catalog, config, VersionSuffixNaming)
    }
}

impl<'a, N: FamilyNaming> Resolver<'a, N> {
    pub fn with_naming(catalog: &'a FeatureCatalog, config: ResolverConfig, naming: N) -> Self {
        Self { catalog, naming, config }
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn expander(&self) -> Expander<'a, &N> {
        Expander::with_naming(self.catalog, &self.naming).with_policy(self.config.preferred_policy)
    }

    /// Expand one feature, looked up by symbolic or short name.
    pub fn expand(&self, name: &str) -> Result<BTreeSet<ResolvedConstrainedFeature>> {
        let root = self
            .catalog
            .resolve(name)
            .ok_or_else(|| CohortError::FeatureNotFound { name: name.to_string() })?;
        Ok(self.expander().expand(root))
    }

    /// Expand every catalog entry, in parallel when configured.
    pub fn expand_all(&self) -> BTreeSet<ResolvedConstrainedFeature> {
        let expander = self.expander();
        if self.config.parallel {
            expander.expand_all_parallel()
        } else {
            expander.expand_all()
        }
    }

    pub fn buckets(&self) -> BucketReport {
        bucket_with_report(self.expand_all())
    }

    /// Expand and bucket the whole catalog and collect diagnostics.
    pub fn report(&self) -> ResolutionReport {
        let resolved = self.expand_all();
        let buckets = bucket_with_report(resolved.iter().cloned());
        ResolutionReport::build(self.catalog, &resolved, &buckets)
    }
}
