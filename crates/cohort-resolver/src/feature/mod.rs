// Feature model
//
// Descriptors as produced by the catalog layer, and the naming convention
// that maps versioned identifiers onto singleton families.

mod descriptor;
mod naming;

pub use descriptor::{FeatureDescriptor, Visibility};
pub use naming::{FamilyNaming, VersionSuffixNaming};
