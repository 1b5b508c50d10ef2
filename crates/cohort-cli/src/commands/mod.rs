//! Subcommands and the setup they share.

pub mod buckets;
pub mod expand;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;

use cohort_resolver::{load_catalog, FeatureCatalog, PreferredPolicy, ResolverConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options that apply to every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub working_dir: PathBuf,
    pub policy: Option<PreferredPolicy>,
}

/// Everything a command needs to resolve: the effective configuration and
/// the loaded catalog.
pub struct Session {
    pub config: ResolverConfig,
    pub catalog: FeatureCatalog,
}

impl Session {
    /// Build the configuration (file, environment, flags) and load the
    /// catalog it points at, unless `catalog` overrides it.
    pub fn open(global: &GlobalOptions, catalog: Option<&Path>, parallel: bool) -> Result<Self> {
        let working_dir = global
            .working_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve working directory {}", global.working_dir.display()))?;

        let mut config = ResolverConfig::build(Some(&working_dir), true)?;
        if let Some(policy) = global.policy {
            config.preferred_policy = policy;
        }
        if parallel {
            config.parallel = true;
        }

        let path = match catalog {
            Some(path) => working_dir.join(path),
            None => match &config.catalog {
                Some(path) => working_dir.join(path),
                None => bail!(
                    "No catalog given. Pass --catalog or set `catalog` in {}",
                    cohort_resolver::config::CONFIG_FILE
                ),
            },
        };

        log::debug!(
            "Resolving with policy {} (parallel: {})",
            config.preferred_policy,
            config.parallel
        );
        let catalog = load_catalog(&path, &config)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?;

        Ok(Self { config, catalog })
    }
}
