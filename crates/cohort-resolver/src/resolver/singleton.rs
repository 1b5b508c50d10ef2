use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Identity of a singleton family.
///
/// Private sets are anchored by a protected or private singleton feature;
/// their choice may differ between unrelated subtrees of one expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SingletonSetId {
    pub family: String,
    pub is_private: bool,
}

impl SingletonSetId {
    pub fn new(family: impl Into<String>, is_private: bool) -> Self {
        Self {
            family: family.into(),
            is_private,
        }
    }

    pub fn public(family: impl Into<String>) -> Self {
        Self::new(family, false)
    }

    pub fn private(family: impl Into<String>) -> Self {
        Self::new(family, true)
    }
}

impl fmt::Display for SingletonSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_private {
            write!(f, "{} (private)", self.family)
        } else {
            write!(f, "{}", self.family)
        }
    }
}

/// The member selected for a singleton family.
///
/// `preferred` is false when the member was reached through a tolerated
/// version rather than the slot's declared default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SingletonChoice {
    pub chosen_name: String,
    pub preferred: bool,
}

impl SingletonChoice {
    pub fn new(chosen_name: impl Into<String>, preferred: bool) -> Self {
        Self {
            chosen_name: chosen_name.into(),
            preferred,
        }
    }

    pub fn preferred(chosen_name: impl Into<String>) -> Self {
        Self::new(chosen_name, true)
    }

    pub fn tolerated(chosen_name: impl Into<String>) -> Self {
        Self::new(chosen_name, false)
    }

    /// Whether both choices select the same member, ignoring preference.
    pub fn selects_same(&self, other: &SingletonChoice) -> bool {
        self.chosen_name == other.chosen_name
    }
}

impl fmt::Display for SingletonChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preferred {
            write!(f, "{}", self.chosen_name)
        } else {
            write!(f, "{} (tolerated)", self.chosen_name)
        }
    }
}

/// A singleton assignment: one choice per family.
pub type Choices = BTreeMap<SingletonSetId, SingletonChoice>;

/// Two assignments are compatible when they agree on every shared family.
pub fn choices_compatible(a: &Choices, b: &Choices) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .all(|(id, choice)| large.get(id).map_or(true, |other| other == choice))
}

/// Entry for a family regardless of which privacy flag anchored it.
pub(crate) fn family_entry<'c>(choices: &'c Choices, family: &str) -> Option<(&'c SingletonSetId, &'c SingletonChoice)> {
    [false, true].into_iter().find_map(|is_private| {
        choices.get_key_value(&SingletonSetId::new(family, is_private))
    })
}
