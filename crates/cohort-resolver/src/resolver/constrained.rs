use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use super::singleton::{choices_compatible, Choices, SingletonChoice, SingletonSetId};
use crate::feature::FeatureDescriptor;

/// A feature paired with the singleton assignment under which it was reached.
///
/// Identity is the feature's symbolic name plus the assignment; two
/// resolutions of the same feature under equal choices are the same value.
#[derive(Debug, Clone)]
pub struct ResolvedConstrainedFeature {
    pub feature: Arc<FeatureDescriptor>,
    pub choices: Choices,
}

impl ResolvedConstrainedFeature {
    pub fn new(feature: Arc<FeatureDescriptor>, choices: Choices) -> Self {
        Self { feature, choices }
    }

    pub fn name(&self) -> &str {
        &self.feature.name
    }

    /// True when no choice in the assignment came from a tolerated version.
    pub fn is_preferred(&self) -> bool {
        self.choices.values().all(|choice| choice.preferred)
    }

    pub fn is_compatible_with(&self, choices: &Choices) -> bool {
        choices_compatible(&self.choices, choices)
    }

    fn key(&self) -> (&str, &Choices) {
        (&self.feature.name, &self.choices)
    }
}

impl PartialEq for ResolvedConstrainedFeature {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ResolvedConstrainedFeature {}

impl Hash for ResolvedConstrainedFeature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for ResolvedConstrainedFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResolvedConstrainedFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for ResolvedConstrainedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.feature.name)?;
        if !self.choices.is_empty() {
            let rendered: Vec<String> = self
                .choices
                .iter()
                .map(|(id, choice)| format!("{}={}", id, choice))
                .collect();
            write!(f, " @ {{{}}}", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// JSON maps need string keys, so choices serialize as a list of entries.
struct ChoiceList<'a>(&'a Choices);

impl Serialize for ChoiceList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (id, choice) in self.0 {
            seq.serialize_element(&ChoiceEntry { id, choice })?;
        }
        seq.end()
    }
}

struct ChoiceEntry<'a> {
    id: &'a SingletonSetId,
    choice: &'a SingletonChoice,
}

impl Serialize for ChoiceEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChoiceEntry", 4)?;
        state.serialize_field("family", &self.id.family)?;
        state.serialize_field("private", &self.id.is_private)?;
        state.serialize_field("chosen", &self.choice.chosen_name)?;
        state.serialize_field("preferred", &self.choice.preferred)?;
        state.end()
    }
}

impl Serialize for ResolvedConstrainedFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolvedConstrainedFeature", 2)?;
        state.serialize_field("feature", &self.feature.name)?;
        state.serialize_field("choices", &ChoiceList(&self.choices))?;
        state.end()
    }
}

/// A set of resolved features sharing one consistent singleton assignment.
///
/// `chosen_singletons` is always the union of the members' choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstrainedFeatureSet {
    features: BTreeSet<ResolvedConstrainedFeature>,
    chosen_singletons: Choices,
}

impl ConstrainedFeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &BTreeSet<ResolvedConstrainedFeature> {
        &self.features
    }

    pub fn chosen_singletons(&self) -> &Choices {
        &self.chosen_singletons
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, rcf: &ResolvedConstrainedFeature) -> bool {
        self.features.contains(rcf)
    }

    /// Distinct feature names in the set, in order.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.features.iter().map(|rcf| rcf.name()).collect();
        names.dedup();
        names
    }

    pub fn accepts(&self, rcf: &ResolvedConstrainedFeature) -> bool {
        rcf.is_compatible_with(&self.chosen_singletons)
    }

    /// Merge a compatible resolution into the set.
    ///
    /// Returns false when the resolution was already a member.
    ///
    /// # Panics
    ///
    /// Panics if the resolution disagrees with the set's assignment.
    pub fn add(&mut self, rcf: ResolvedConstrainedFeature) -> bool {
        assert!(
            self.accepts(&rcf),
            "{} conflicts with the singleton choices of this feature set",
            rcf
        );
        if self.features.contains(&rcf) {
            return false;
        }
        for (id, choice) in &rcf.choices {
            self.chosen_singletons.insert(id.clone(), choice.clone());
        }
        self.features.insert(rcf);
        true
    }

    /// Whether every member of this set is also in `other` and the
    /// assignments agree, making this set redundant next to `other`.
    pub fn is_subsumed_by(&self, other: &ConstrainedFeatureSet) -> bool {
        self.features.is_subset(&other.features)
            && choices_compatible(&self.chosen_singletons, &other.chosen_singletons)
    }
}

impl Serialize for ConstrainedFeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ConstrainedFeatureSet", 2)?;
        state.serialize_field("features", &self.features)?;
        state.serialize_field("chosenSingletons", &ChoiceList(&self.chosen_singletons))?;
        state.end()
    }
}

impl fmt::Display for ConstrainedFeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let choices: Vec<String> = self
            .chosen_singletons
            .iter()
            .map(|(id, choice)| format!("{}={}", id, choice))
            .collect();
        write!(f, "[{}] {{{}}}", self.feature_names().join(", "), choices.join(", "))
    }
}
