//! Read-only lookup of funnels and benchmarks by (source, vertical).

use std::path::Path;

use tracing::debug;

use funnelscope_core::{DiagnoseError, FunnelSchema, VerticalBenchmarks};

use crate::loader::{LoadResult, RegistryLoader, Result};
use crate::schema::{BenchmarksDocument, DocumentMetadata, FunnelDocument, RegistryDocument};

/// Funnel schemas and vertical benchmarks, assembled once at startup.
///
/// Lookups prefer a document scoped to the exact source over one that covers
/// the whole vertical. Disabled documents never match.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    funnels: Vec<FunnelDocument>,
    benchmarks: Vec<BenchmarksDocument>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: impl IntoIterator<Item = RegistryDocument>) -> Self {
        let mut registry = Self::new();
        for doc in documents {
            registry.insert(doc);
        }
        registry
    }

    /// Load every document under `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<(Self, Vec<LoadResult>)> {
        let mut loader = RegistryLoader::new(dir.as_ref());
        let results = loader.load_all()?;
        Ok((loader.registry(), results))
    }

    pub fn insert(&mut self, doc: RegistryDocument) {
        match doc {
            RegistryDocument::Funnel(d) => self.funnels.push(d),
            RegistryDocument::Benchmarks(d) => self.benchmarks.push(d),
        }
    }

    /// Funnel schema for the pair; a miss is a hard failure.
    pub fn funnel(&self, source: &str, vertical: &str) -> funnelscope_core::Result<&FunnelSchema> {
        best_match(&self.funnels, |d| &d.metadata, source, vertical)
            .map(|d| {
                debug!(source, vertical, document_id = %d.metadata.id, "resolved funnel");
                &d.spec
            })
            .ok_or_else(|| DiagnoseError::UnknownFunnel {
                source_name: source.to_string(),
                vertical: vertical.to_string(),
            })
    }

    /// Benchmarks for the pair, if any are registered.
    pub fn benchmarks(&self, source: &str, vertical: &str) -> Option<&VerticalBenchmarks> {
        best_match(&self.benchmarks, |d| &d.metadata, source, vertical).map(|d| &d.spec)
    }

    pub fn funnel_count(&self) -> usize {
        self.funnels.len()
    }

    pub fn benchmark_count(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funnels.is_empty() && self.benchmarks.is_empty()
    }

    /// Registered (source, vertical) funnel pairs, in load order.
    pub fn funnel_pairs(&self) -> Vec<(&str, &str)> {
        self.funnels
            .iter()
            .filter(|d| d.metadata.enabled)
            .filter_map(|d| Some((d.metadata.source.as_deref()?, d.metadata.vertical.as_str())))
            .collect()
    }
}

/// Source-scoped match first, then vertical-wide.
fn best_match<'a, T>(
    docs: &'a [T],
    metadata: impl Fn(&T) -> &DocumentMetadata,
    source: &str,
    vertical: &str,
) -> Option<&'a T> {
    let mut fallback = None;
    for doc in docs {
        let meta = metadata(doc);
        if !meta.applies_to(source, vertical) {
            continue;
        }
        if meta.source.is_some() {
            return Some(doc);
        }
        fallback = fallback.or(Some(doc));
    }
    fallback
}
