//! Core [`RegistryLoader`]: filesystem-backed document loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::registry::Registry;
use crate::schema::{DocumentEnvelope, RegistryDocument};
use crate::validation::validate_document;

use super::error::{LoadResult, LoadStatus, RegistryError, Result};

/// Filesystem-backed registry loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and keeps
/// every valid document keyed by `metadata.id`. A later file with an id that
/// is already loaded is reported as failed and does not replace the first.
pub struct RegistryLoader {
    registry_dir: PathBuf,
    documents: BTreeMap<String, RegistryDocument>,
}

impl RegistryLoader {
    pub fn new(registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            documents: BTreeMap::new(),
        }
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    /// Recursively scan the registry directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse and validation errors
    /// are reported per file and do not abort the scan. A missing directory
    /// is an error.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let dir = self.registry_dir.clone();
        self.scan_dir_recursive(&dir, &mut results)?;

        let loaded = results.iter().filter(|r| r.status.is_loaded()).count();
        let failed = results.iter().filter(|r| r.status.is_failed()).count();
        info!(dir = %dir.display(), loaded, failed, "registry scan complete");
        Ok(results)
    }

    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        // Stable order so duplicate-id resolution does not depend on the filesystem.
        paths.sort();

        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let status = match self.load_file(&path).and_then(|doc| self.insert_document(doc)) {
                Ok(document_id) => {
                    info!(
                        document_id = %document_id,
                        path = %path.display(),
                        "loaded registry document"
                    );
                    LoadStatus::Loaded { document_id }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load registry document");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    fn insert_document(&mut self, doc: RegistryDocument) -> Result<String> {
        let id = doc.metadata().id.clone();
        if self.documents.contains_key(&id) {
            return Err(RegistryError::Validation(format!("duplicate document id '{}'", id)));
        }
        self.documents.insert(id.clone(), doc);
        Ok(id)
    }

    /// Parse and validate a single YAML file.
    ///
    /// First pass reads the envelope to get `kind`; second pass deserializes
    /// the kind-specific type. Validation warnings are logged, errors reject
    /// the document.
    pub fn load_file(&self, path: &Path) -> Result<RegistryDocument> {
        let contents = fs::read_to_string(path)?;
        parse_document(&contents)
    }

    /// Loaded documents keyed by id.
    pub fn documents(&self) -> &BTreeMap<String, RegistryDocument> {
        &self.documents
    }

    /// Build a lookup registry from everything loaded so far.
    pub fn registry(&self) -> Registry {
        Registry::from_documents(self.documents.values().cloned())
    }
}

/// Parse and validate one YAML document from a string.
pub fn parse_document(contents: &str) -> Result<RegistryDocument> {
    let envelope: DocumentEnvelope = serde_yaml::from_str(contents)?;

    if envelope.metadata.id.is_empty() {
        return Err(RegistryError::Validation(
            "document metadata.id must not be empty".to_string(),
        ));
    }

    let doc = envelope.parse_full().map_err(|e| {
        RegistryError::Validation(format!(
            "failed to parse document '{}': {}",
            envelope.metadata.id, e
        ))
    })?;

    let validation = validate_document(&doc);
    for w in &validation.warnings {
        warn!(document_id = %envelope.metadata.id, path = %w.path, "{}", w.message);
    }
    if !validation.valid {
        return Err(RegistryError::Validation(format!(
            "document '{}' is invalid: {}",
            envelope.metadata.id,
            validation.error_summary()
        )));
    }
    Ok(doc)
}
