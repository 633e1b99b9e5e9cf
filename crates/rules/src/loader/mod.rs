//! Filesystem registry loader.
//!
//! Scans the registry directory for YAML documents, parses them via two-pass
//! deserialization (DocumentEnvelope -> RegistryDocument), validates them,
//! and reports a status per file.

mod core;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::{parse_document, RegistryLoader};
pub use self::error::{LoadResult, LoadStatus, RegistryError, Result};
