use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::naming::{FamilyNaming, VersionSuffixNaming};

/// Scoping of a feature.
///
/// Only public features are meant to be enabled directly; singleton families
/// anchored by a protected or private feature are tracked as private
/// singleton sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    /// Subsystem manifests default to private when no directive is given
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// A feature as known to the catalog.
///
/// `content_features` maps each nested feature dependency, in declaration
/// order, to the sibling versions the dependency slot tolerates in place of
/// the named default. An empty list means only the default is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    /// Symbolic name, e.g. `com.example.servlet-3.1`
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// User-facing alias, e.g. `servlet-3.1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub singleton: bool,

    #[serde(default, deserialize_with = "deserialize_content_features")]
    pub content_features: IndexMap<String, Vec<String>>,
}

impl FeatureDescriptor {
    /// Create a public, non-singleton feature with no dependencies.
    ///
    /// The version is taken from the name's version suffix when present.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let version = VersionSuffixNaming.version(&name).unwrap_or_default();

        Self {
            name,
            version,
            short_name: None,
            visibility: Visibility::Public,
            singleton: false,
            content_features: IndexMap::new(),
        }
    }

    /// Create a public singleton feature with no dependencies.
    pub fn singleton(name: impl Into<String>) -> Self {
        Self::new(name).with_singleton(true)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Add a dependency that only accepts the named feature.
    pub fn with_dependency(self, name: impl Into<String>) -> Self {
        self.with_tolerating_dependency(name, Vec::<String>::new())
    }

    /// Add a dependency that also accepts the given sibling versions.
    pub fn with_tolerating_dependency<I, S>(mut self, name: impl Into<String>, tolerated: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_features
            .insert(name.into(), tolerated.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    /// Iterate nested dependencies with their tolerated versions.
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.content_features
            .iter()
            .map(|(name, tolerated)| (name.as_str(), tolerated.as_slice()))
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.content_features.contains_key(name)
    }
}

impl fmt::Display for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Tolerated versions may be written as `null`, a comma separated string or
/// a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ToleranceRepr {
    Missing(()),
    Listed(String),
    Many(Vec<String>),
}

impl ToleranceRepr {
    fn into_versions(self) -> Vec<String> {
        let versions = match self {
            ToleranceRepr::Missing(()) => Vec::new(),
            ToleranceRepr::Listed(value) => value.split(',').map(str::to_string).collect(),
            ToleranceRepr::Many(values) => values,
        };
        versions
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

fn deserialize_content_features<'de, D>(deserializer: D) -> Result<IndexMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: IndexMap<String, ToleranceRepr> = IndexMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, tolerated)| (name, tolerated.into_versions()))
        .collect())
}
