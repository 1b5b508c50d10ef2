//! Resolver configuration.
//!
//! Values come from, in increasing priority:
//!
//! 1. Built-in defaults
//! 2. `cohort.toml`, searched upward from the working directory
//! 3. Environment variables (`COHORT_PARALLEL`, `COHORT_PREFERRED_POLICY`,
//!    `COHORT_CATALOG`)
//!
//! Command line flags are applied on top by the binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CohortError, Result};
use crate::resolver::PreferredPolicy;

pub const CONFIG_FILE: &str = "cohort.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// How the preferred flag is settled for a family reached twice
    pub preferred_policy: PreferredPolicy,

    /// Expand catalog roots on the rayon thread pool
    pub parallel: bool,

    /// Catalog location (JSON file, manifest, or directory)
    pub catalog: Option<PathBuf>,

    /// File extensions picked up when loading a catalog directory
    pub manifest_extensions: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            preferred_policy: PreferredPolicy::default(),
            parallel: false,
            catalog: None,
            manifest_extensions: vec!["mf".to_string(), "json".to_string()],
        }
    }
}

impl ResolverConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `cohort.toml`, searching upward from `start_dir`.
    ///
    /// A relative `catalog` path is taken relative to the file it appears in.
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.is_file() {
                log::debug!("Loading configuration from {}", config_path.display());
                let content = fs::read_to_string(&config_path)?;
                let mut config = Self::from_toml(&content)?;
                if let Some(catalog) = config.catalog.take() {
                    config.catalog = Some(if catalog.is_relative() { current.join(catalog) } else { catalog });
                }
                return Ok(Some(config));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Defaults, then `cohort.toml` if found, then the environment.
    pub fn build(start_dir: Option<&Path>, use_environment: bool) -> Result<Self> {
        let mut config = match start_dir {
            Some(dir) => Self::load(dir)?.unwrap_or_default(),
            None => Self::default(),
        };

        if use_environment {
            config.apply_environment(|var| env::var(var).ok())?;
        }

        Ok(config)
    }

    /// Apply `COHORT_*` overrides through the given lookup.
    pub fn apply_environment<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup("COHORT_PARALLEL") {
            self.parallel = parse_bool(&value)
                .ok_or_else(|| CohortError::Config(format!("COHORT_PARALLEL must be a boolean, got '{}'", value)))?;
        }

        if let Some(value) = lookup("COHORT_PREFERRED_POLICY") {
            self.preferred_policy = value
                .parse::<PreferredPolicy>()
                .map_err(|e| CohortError::Config(format!("COHORT_PREFERRED_POLICY: {}", e)))?;
        }

        if let Some(value) = lookup("COHORT_CATALOG") {
            self.catalog = Some(PathBuf::from(value));
        }

        Ok(())
    }

    /// Whether a file should be read when loading a catalog directory.
    pub fn is_manifest_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.manifest_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
