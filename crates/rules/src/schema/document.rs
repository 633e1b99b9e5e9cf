//! Multi-kind document container and accessors.

use funnelscope_core::{FunnelSchema, VerticalBenchmarks};

use super::{BenchmarksDocument, DocumentKind, DocumentMetadata, FunnelDocument};

/// A fully deserialized registry document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryDocument {
    Funnel(FunnelDocument),
    Benchmarks(BenchmarksDocument),
}

impl RegistryDocument {
    pub fn metadata(&self) -> &DocumentMetadata {
        match self {
            RegistryDocument::Funnel(doc) => &doc.metadata,
            RegistryDocument::Benchmarks(doc) => &doc.metadata,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            RegistryDocument::Funnel(_) => DocumentKind::FunnelSchema,
            RegistryDocument::Benchmarks(_) => DocumentKind::VerticalBenchmarks,
        }
    }

    pub fn as_funnel(&self) -> Option<&FunnelSchema> {
        match self {
            RegistryDocument::Funnel(doc) => Some(&doc.spec),
            _ => None,
        }
    }

    pub fn as_benchmarks(&self) -> Option<&VerticalBenchmarks> {
        match self {
            RegistryDocument::Benchmarks(doc) => Some(&doc.spec),
            _ => None,
        }
    }
}
