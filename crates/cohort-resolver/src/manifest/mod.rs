// Subsystem feature manifests
//
// Reads `*.mf` files in the OSGi subsystem format into feature descriptors.
// Only the headers that matter for resolution are interpreted; bundle and
// file content is ignored.

mod header;

pub use header::{parse_clauses, parse_headers, Clause};

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{CohortError, Result};
use crate::feature::{FamilyNaming, FeatureDescriptor, VersionSuffixNaming, Visibility};

pub const SYMBOLIC_NAME: &str = "Subsystem-SymbolicName";
pub const VERSION: &str = "Subsystem-Version";
pub const CONTENT: &str = "Subsystem-Content";
pub const SHORT_NAME: &str = "IBM-ShortName";

/// `type` attribute of content clauses that name nested features.
pub const FEATURE_TYPE: &str = "osgi.subsystem.feature";

const DEFAULT_VERSION: &str = "0.0.0";

/// A parsed manifest and where it came from.
#[derive(Debug, Clone)]
pub struct FeatureManifest {
    origin: String,
    headers: IndexMap<String, String>,
}

impl FeatureManifest {
    pub fn parse(content: &str, origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        let headers = parse_headers(content, &origin)?;
        Ok(Self { origin, headers })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path.display().to_string())
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Header value, looked up case insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn to_descriptor(&self) -> Result<FeatureDescriptor> {
        let symbolic = self
            .header(SYMBOLIC_NAME)
            .ok_or_else(|| self.invalid(format!("missing {} header", SYMBOLIC_NAME)))?;
        let identity = self.single_clause(SYMBOLIC_NAME, symbolic)?;

        let visibility = match identity.directive("visibility") {
            Some(value) => value.parse::<Visibility>().map_err(|e| self.invalid(e))?,
            None => Visibility::default(),
        };
        let singleton = match identity.directive("singleton") {
            Some(value) => parse_flag(value).ok_or_else(|| {
                self.invalid(format!("singleton:= must be true or false, got '{}'", value))
            })?,
            None => false,
        };

        let version = self
            .header(VERSION)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| VersionSuffixNaming.version(&identity.name))
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let mut descriptor = FeatureDescriptor::new(identity.name)
            .with_visibility(visibility)
            .with_singleton(singleton)
            .with_version(version);

        if let Some(short_name) = self.header(SHORT_NAME).map(str::trim).filter(|s| !s.is_empty()) {
            descriptor = descriptor.with_short_name(short_name);
        }

        if let Some(content) = self.header(CONTENT) {
            for clause in parse_clauses(content, &self.origin)? {
                if clause.attribute("type") != Some(FEATURE_TYPE) {
                    continue;
                }
                let tolerated: Vec<String> = clause
                    .directive("ibm.tolerates")
                    .map(|list| {
                        list.split(',')
                            .map(str::trim)
                            .filter(|v| !v.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                descriptor = descriptor.with_tolerating_dependency(clause.name, tolerated);
            }
        }

        Ok(descriptor)
    }

    fn single_clause(&self, header: &str, value: &str) -> Result<Clause> {
        let mut clauses = parse_clauses(value, &self.origin)?;
        if clauses.len() != 1 {
            return Err(self.invalid(format!("{} must name exactly one feature", header)));
        }
        Ok(clauses.remove(0))
    }

    fn invalid(&self, message: impl Into<String>) -> CohortError {
        CohortError::invalid_manifest(self.origin.clone(), message)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
