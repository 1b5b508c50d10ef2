mod bucketing;
mod constrained;
mod expansion;
mod policy;
#[allow(clippy::module_inception)]
mod resolver;
mod singleton;


pub use bucketing::{bucket, bucket_with_report, BucketReport};
pub use constrained::{ConstrainedFeatureSet, ResolvedConstrainedFeature};
pub use expansion::{expand, expand_all, expand_all_parallel, Expander};
pub use policy::PreferredPolicy;
pub use resolver::Resolver;
pub use singleton::{choices_compatible, Choices, SingletonChoice, SingletonSetId};
