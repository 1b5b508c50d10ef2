use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::singleton::SingletonChoice;

/// Decides the `preferred` flag when a family that is already fixed to a
/// member is reached again through another dependency slot selecting the
/// same member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreferredPolicy {
    /// The first slot on the path that fixed the family decides.
    #[default]
    FirstDeclared,
    /// Any slot naming the member as its default marks it preferred.
    AnyPreferred,
}

impl PreferredPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredPolicy::FirstDeclared => "first-declared",
            PreferredPolicy::AnyPreferred => "any-preferred",
        }
    }

    /// Combine an existing choice with a later one for the same member.
    pub fn merge(&self, existing: &SingletonChoice, incoming: &SingletonChoice) -> SingletonChoice {
        debug_assert!(existing.selects_same(incoming));
        match self {
            PreferredPolicy::FirstDeclared => existing.clone(),
            PreferredPolicy::AnyPreferred => SingletonChoice::new(
                existing.chosen_name.clone(),
                existing.preferred || incoming.preferred,
            ),
        }
    }
}

impl fmt::Display for PreferredPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreferredPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-declared" | "first" => Ok(PreferredPolicy::FirstDeclared),
            "any-preferred" | "any" => Ok(PreferredPolicy::AnyPreferred),
            other => Err(format!(
                "unknown preferred policy '{}' (expected first-declared or any-preferred)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declared_keeps_existing() {
        let existing = SingletonChoice::tolerated("s-2.0");
        let incoming = SingletonChoice::preferred("s-2.0");
        assert_eq!(PreferredPolicy::FirstDeclared.merge(&existing, &incoming), existing);
    }

    #[test]
    fn test_any_preferred_upgrades() {
        let existing = SingletonChoice::tolerated("s-2.0");
        let incoming = SingletonChoice::preferred("s-2.0");
        assert_eq!(PreferredPolicy::AnyPreferred.merge(&existing, &incoming), incoming);
        assert_eq!(PreferredPolicy::AnyPreferred.merge(&existing, &existing), existing);
    }

    #[test]
    fn test_parse() {
        assert_eq!("first-declared".parse::<PreferredPolicy>(), Ok(PreferredPolicy::FirstDeclared));
        assert_eq!("ANY-PREFERRED".parse::<PreferredPolicy>(), Ok(PreferredPolicy::AnyPreferred));
        assert!("latest".parse::<PreferredPolicy>().is_err());
        assert_eq!(PreferredPolicy::default().to_string(), "first-declared");
    }
}
