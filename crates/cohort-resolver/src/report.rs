//! Catalog-wide diagnostics derived from expansion and bucketing results.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::catalog::{DanglingReference, FeatureCatalog};
use crate::resolver::{BucketReport, ConstrainedFeatureSet, ResolvedConstrainedFeature};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub features: Vec<String>,
    /// `family=member` pairs, private families suffixed with ` (private)`
    pub singletons: Vec<String>,
}

impl From<&ConstrainedFeatureSet> for BucketSummary {
    fn from(bucket: &ConstrainedFeatureSet) -> Self {
        Self {
            features: bucket.feature_names().into_iter().map(str::to_string).collect(),
            singletons: bucket
                .chosen_singletons()
                .iter()
                .map(|(id, choice)| format!("{}={}", id, choice))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub feature_count: usize,
    pub resolution_count: usize,
    /// Catalog entries that no consistent resolution covers
    pub unresolvable: Vec<String>,
    pub dangling: Vec<DanglingReference>,
    /// Tolerated resolutions that fit no bucket
    pub unplaced: Vec<String>,
    pub buckets: Vec<BucketSummary>,
}

impl ResolutionReport {
    pub fn build(
        catalog: &FeatureCatalog,
        resolved: &BTreeSet<ResolvedConstrainedFeature>,
        buckets: &BucketReport,
    ) -> Self {
        let covered: HashSet<&str> = resolved.iter().map(|rcf| rcf.name()).collect();
        let unresolvable = catalog
            .names()
            .filter(|name| !covered.contains(name))
            .map(str::to_string)
            .collect();

        Self {
            feature_count: catalog.len(),
            resolution_count: resolved.len(),
            unresolvable,
            dangling: catalog.dangling_references(),
            unplaced: buckets.unplaced.iter().map(|rcf| rcf.to_string()).collect(),
            buckets: buckets.buckets.iter().map(BucketSummary::from).collect(),
        }
    }

    /// No unresolvable features and no dangling references.
    pub fn is_clean(&self) -> bool {
        self.unresolvable.is_empty() && self.dangling.is_empty()
    }
}
