//! Grouping of resolved features into installable configuration sets.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use super::constrained::{ConstrainedFeatureSet, ResolvedConstrainedFeature};

/// Buckets plus the tolerated-version resolutions no bucket could take.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketReport {
    pub buckets: BTreeSet<ConstrainedFeatureSet>,
    pub unplaced: BTreeSet<ResolvedConstrainedFeature>,
}

/// Merge resolutions into maximal mutually compatible feature sets.
pub fn bucket<I>(rcfs: I) -> BTreeSet<ConstrainedFeatureSet>
where
    I: IntoIterator<Item = ResolvedConstrainedFeature>,
{
    bucket_with_report(rcfs).buckets
}

/// Merge resolutions into maximal mutually compatible feature sets.
///
/// Resolutions whose choices are all preferred seed buckets; each bucket is
/// grown to a fixed point, taking preferred resolutions before tolerated
/// ones so the defaults shape the bucket. A resolution that relies on a
/// tolerated version only joins a bucket that already agrees with it.
/// Buckets that are subsumed by another bucket are dropped. Input order
/// does not matter.
///
/// # Panics
///
/// Panics if a resolution's choices are internally inconsistent, which
/// [`crate::Expander`] never produces.
pub fn bucket_with_report<I>(rcfs: I) -> BucketReport
where
    I: IntoIterator<Item = ResolvedConstrainedFeature>,
{
    let start = Instant::now();
    let all: BTreeSet<ResolvedConstrainedFeature> = rcfs.into_iter().collect();
    for rcf in &all {
        check_consistent(rcf);
    }

    let (preferred, tolerated): (Vec<&ResolvedConstrainedFeature>, Vec<&ResolvedConstrainedFeature>) =
        all.iter().partition(|rcf| rcf.is_preferred());

    let mut buckets: Vec<ConstrainedFeatureSet> = Vec::new();
    for seed in preferred.iter().filter(|rcf| !rcf.choices.is_empty()) {
        if buckets.iter().any(|b| b.contains(seed)) {
            continue;
        }
        let mut bucket = ConstrainedFeatureSet::new();
        bucket.add((*seed).clone());
        grow(&mut bucket, &preferred, &tolerated);
        buckets.push(bucket);
    }

    // Nothing constrains the catalog: one bucket holds every free resolution
    if buckets.is_empty() && !preferred.is_empty() {
        let mut bucket = ConstrainedFeatureSet::new();
        for rcf in &preferred {
            bucket.add((*rcf).clone());
        }
        grow(&mut bucket, &preferred, &tolerated);
        buckets.push(bucket);
    }

    let buckets = drop_subsumed(buckets);
    let unplaced: BTreeSet<ResolvedConstrainedFeature> = tolerated
        .into_iter()
        .filter(|rcf| !buckets.iter().any(|b| b.contains(rcf)))
        .cloned()
        .collect();

    log::info!(
        "Grouped {} resolutions into {} buckets in {:.3} seconds",
        all.len(),
        buckets.len(),
        start.elapsed().as_secs_f64()
    );
    if !unplaced.is_empty() {
        log::debug!("{} tolerated resolutions fit no bucket", unplaced.len());
    }

    BucketReport { buckets, unplaced }
}

/// Add compatible resolutions until nothing more fits.
fn grow(
    bucket: &mut ConstrainedFeatureSet,
    preferred: &[&ResolvedConstrainedFeature],
    tolerated: &[&ResolvedConstrainedFeature],
) {
    loop {
        let mut changed = false;
        for rcf in preferred {
            if !bucket.contains(rcf) && bucket.accepts(rcf) {
                bucket.add((*rcf).clone());
                changed = true;
            }
        }
        if changed {
            continue;
        }

        // One at a time, so preferred resolutions get to react to each new constraint
        match tolerated.iter().find(|rcf| !bucket.contains(rcf) && bucket.accepts(rcf)) {
            Some(rcf) => {
                bucket.add((*rcf).clone());
            }
            None => break,
        }
    }
}

fn drop_subsumed(buckets: Vec<ConstrainedFeatureSet>) -> BTreeSet<ConstrainedFeatureSet> {
    let distinct: Vec<ConstrainedFeatureSet> = buckets.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    distinct
        .iter()
        .enumerate()
        .filter(|(i, bucket)| {
            !distinct
                .iter()
                .enumerate()
                .any(|(j, other)| *i != j && bucket.is_subsumed_by(other))
        })
        .map(|(_, bucket)| bucket.clone())
        .collect()
}

fn check_consistent(rcf: &ResolvedConstrainedFeature) {
    let families: Vec<&str> = rcf.choices.keys().map(|id| id.family.as_str()).collect();
    assert!(
        families.windows(2).all(|pair| pair[0] != pair[1]),
        "{} carries two choices for one singleton family",
        rcf
    );
    assert!(
        !rcf.feature.singleton || rcf.choices.values().any(|choice| choice.chosen_name == rcf.feature.name),
        "{} is a singleton but its choices do not select it",
        rcf
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureDescriptor;
    use crate::resolver::singleton::{Choices, SingletonChoice, SingletonSetId};
    use std::sync::Arc;

    fn rcf(name: &str, singleton: bool, entries: &[(&str, &str, bool)]) -> ResolvedConstrainedFeature {
        let choices: Choices = entries
            .iter()
            .map(|(family, chosen, preferred)| {
                (SingletonSetId::public(*family), SingletonChoice::new(*chosen, *preferred))
            })
            .collect();
        let feature = FeatureDescriptor::new(name).with_singleton(singleton);
        ResolvedConstrainedFeature::new(Arc::new(feature), choices)
    }

    fn rendered(buckets: &BTreeSet<ConstrainedFeatureSet>) -> Vec<String> {
        buckets.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        let report = bucket_with_report(Vec::new());
        assert!(report.buckets.is_empty());
        assert!(report.unplaced.is_empty());
    }

    #[test]
    fn test_free_resolutions_share_one_bucket() {
        let buckets = bucket(vec![rcf("a-1.0", false, &[]), rcf("b-1.0", false, &[])]);
        assert_eq!(rendered(&buckets), vec!["[a-1.0, b-1.0] {}"]);
    }

    #[test]
    fn test_free_resolutions_fold_into_constrained_buckets() {
        let buckets = bucket(vec![
            rcf("plain-1.0", false, &[]),
            rcf("s-1.0", true, &[("s", "s-1.0", true)]),
            rcf("s-2.0", true, &[("s", "s-2.0", true)]),
        ]);
        assert_eq!(
            rendered(&buckets),
            vec!["[plain-1.0, s-1.0] {s=s-1.0}", "[plain-1.0, s-2.0] {s=s-2.0}"]
        );
    }

    #[test]
    fn test_independent_families_merge() {
        let buckets = bucket(vec![
            rcf("s-1.0", true, &[("s", "s-1.0", true)]),
            rcf("t-1.0", true, &[("t", "t-1.0", true)]),
        ]);
        assert_eq!(rendered(&buckets), vec!["[s-1.0, t-1.0] {s=s-1.0, t=t-1.0}"]);
    }

    #[test]
    fn test_tolerated_resolution_joins_agreeing_bucket() {
        let report = bucket_with_report(vec![
            rcf("t-1.0", true, &[("t", "t-1.0", true)]),
            rcf("f-1.0", false, &[("s", "s-2.0", false)]),
        ]);
        assert_eq!(
            rendered(&report.buckets),
            vec!["[f-1.0, t-1.0] {s=s-2.0 (tolerated), t=t-1.0}"]
        );
        assert!(report.unplaced.is_empty());
    }

    #[test]
    fn test_tolerated_resolution_never_seeds() {
        let report = bucket_with_report(vec![
            rcf("s-2.0", true, &[("s", "s-2.0", true)]),
            rcf("f-1.0", false, &[("s", "s-2.0", false)]),
        ]);
        assert_eq!(rendered(&report.buckets), vec!["[s-2.0] {s=s-2.0}"]);
        assert_eq!(report.unplaced.len(), 1);
        assert_eq!(report.unplaced.iter().next().unwrap().name(), "f-1.0");
    }

    #[test]
    fn test_order_invariance() {
        let input = vec![
            rcf("f-1.0", false, &[("s", "s-1.0", true), ("t", "t-1.0", true)]),
            rcf("g-1.0", false, &[("t", "t-2.0", true)]),
            rcf("s-1.0", true, &[("s", "s-1.0", true)]),
            rcf("t-1.0", true, &[("t", "t-1.0", true)]),
            rcf("t-2.0", true, &[("t", "t-2.0", true)]),
            rcf("h-1.0", false, &[]),
        ];
        let forward = bucket(input.clone());
        let backward = bucket(input.into_iter().rev());
        assert_eq!(forward, backward);
    }

    #[test]
    #[should_panic(expected = "is a singleton but its choices do not select it")]
    fn test_inconsistent_singleton_panics() {
        bucket(vec![rcf("s-1.0", true, &[("s", "s-2.0", true)])]);
    }

    #[test]
    #[should_panic(expected = "carries two choices for one singleton family")]
    fn test_split_family_panics() {
        let mut bad = rcf("f-1.0", false, &[("s", "s-1.0", true)]);
        bad.choices.insert(SingletonSetId::private("s"), SingletonChoice::preferred("s-2.0"));
        bucket(vec![bad]);
    }
}
