//! Error types and load result structures for the registry loader.

use std::path::PathBuf;

/// Errors that can occur while loading registry documents.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Document failed validation (unknown kind, bad stages, duplicate id).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Outcome of loading a single document file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Document was parsed, validated and registered.
    Loaded { document_id: String },
    /// File was skipped (dotfile, non-YAML).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}
