use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohortError {
    // Parsing errors
    #[error("Failed to parse feature catalog: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse cohort.toml: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid feature manifest {origin}: {message}")]
    InvalidManifest { origin: String, message: String },

    // Catalog errors
    #[error("Feature defined twice: {name}")]
    DuplicateFeature { name: String },

    #[error("Feature not found: {name}")]
    FeatureNotFound { name: String },

    #[error("Catalog path does not exist: {}", path.display())]
    CatalogNotFound { path: PathBuf },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CohortError {
    pub(crate) fn invalid_manifest(origin: impl Into<String>, message: impl Into<String>) -> Self {
        CohortError::InvalidManifest {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CohortError>;
