/// Maps versioned feature identifiers onto their family.
///
/// `family` must be injective over the members of one family: two
/// identifiers share a family exactly when they differ only by version.
pub trait FamilyNaming: Send + Sync {
    /// Base family name of an identifier (`"servlet-3.1"` -> `"servlet"`).
    fn family(&self, name: &str) -> String;

    /// Sibling identifier obtained by swapping in another version
    /// (`("servlet-3.1", "4.0")` -> `"servlet-4.0"`).
    fn substitute(&self, name: &str, version: &str) -> String;

    /// Version suffix of an identifier, if it carries one.
    fn version(&self, _name: &str) -> Option<String> {
        None
    }
}

impl<T: FamilyNaming + ?Sized> FamilyNaming for &T {
    fn family(&self, name: &str) -> String {
        (**self).family(name)
    }

    fn substitute(&self, name: &str, version: &str) -> String {
        (**self).substitute(name, version)
    }

    fn version(&self, name: &str) -> Option<String> {
        (**self).version(name)
    }
}

/// The `<family>-<version>` convention used by feature manifests.
///
/// The version is whatever follows the last `-` when it starts with a digit.
/// Identifiers without such a suffix are versionless and form their own
/// family.
///
/// ```
/// use cohort_resolver::{FamilyNaming, VersionSuffixNaming};
///
/// let naming = VersionSuffixNaming;
/// assert_eq!(naming.family("com.example.servlet-3.1"), "com.example.servlet");
/// assert_eq!(naming.substitute("com.example.servlet-3.1", "4.0"), "com.example.servlet-4.0");
/// assert_eq!(naming.family("com.example.persistence"), "com.example.persistence");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionSuffixNaming;

impl VersionSuffixNaming {
    fn split(name: &str) -> (&str, Option<&str>) {
        match name.rfind('-') {
            Some(pos) => {
                let suffix = &name[pos + 1..];
                if suffix.starts_with(|c: char| c.is_ascii_digit()) {
                    (&name[..pos], Some(suffix))
                } else {
                    (name, None)
                }
            }
            None => (name, None),
        }
    }
}

impl FamilyNaming for VersionSuffixNaming {
    fn family(&self, name: &str) -> String {
        Self::split(name).0.to_string()
    }

    fn substitute(&self, name: &str, version: &str) -> String {
        format!("{}-{}", Self::split(name).0, version)
    }

    fn version(&self, name: &str) -> Option<String> {
        Self::split(name).1.map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of_versioned_name() {
        let naming = VersionSuffixNaming;
        assert_eq!(naming.family("singleton-1.0"), "singleton");
        assert_eq!(naming.family("io.openliberty.persistence-3.2"), "io.openliberty.persistence");
    }

    #[test]
    fn test_family_keeps_inner_dashes() {
        let naming = VersionSuffixNaming;
        assert_eq!(naming.family("ejb-lite-3.2"), "ejb-lite");
        assert_eq!(naming.version("ejb-lite-3.2"), Some("3.2".to_string()));
    }

    #[test]
    fn test_versionless_name_is_its_own_family() {
        let naming = VersionSuffixNaming;
        assert_eq!(naming.family("persistence"), "persistence");
        assert_eq!(naming.family("ejb-lite"), "ejb-lite");
        assert_eq!(naming.version("ejb-lite"), None);
    }

    #[test]
    fn test_substitute() {
        let naming = VersionSuffixNaming;
        assert_eq!(naming.substitute("singleton-1.0", "2.0"), "singleton-2.0");
        assert_eq!(naming.substitute("servlet", "4.0"), "servlet-4.0");
    }

    #[test]
    fn test_reference_delegates() {
        fn sibling<N: FamilyNaming>(naming: N, name: &str, version: &str) -> String {
            naming.substitute(name, version)
        }

        let naming = VersionSuffixNaming;
        let by_ref: &dyn FamilyNaming = &naming;
        assert_eq!(by_ref.family("a-1.0"), "a");
        assert_eq!(sibling(&naming, "a-1.0", "1.1"), "a-1.1");
        assert_eq!(sibling(by_ref, "a-1.0", "2.0"), "a-2.0");
    }
}
