//! Funnel and benchmark registry loaded from YAML documents.
//!
//! This crate provides:
//! - YAML document schema with two-pass (envelope → kind) deserialization
//! - Filesystem loader reporting per-file load status
//! - Structural validation with path-addressed errors and suggestions
//! - [`Registry`] lookups by (source, vertical)

pub mod loader;
pub mod registry;
pub mod schema;
pub mod validation;

pub use loader::{LoadResult, LoadStatus, RegistryError, RegistryLoader};
pub use registry::Registry;
pub use schema::{BenchmarksDocument, DocumentKind, FunnelDocument, RegistryDocument};
