//! YAML document schema types with serde deserialization.
//!
//! Defines the type hierarchy for registry documents:
//! - `DocumentEnvelope`: lightweight first-pass header (apiVersion, kind, metadata)
//! - `RegistryDocument`: enum dispatching to kind-specific types
//! - `FunnelDocument` / `BenchmarksDocument`: the concrete kinds

mod benchmarks;
mod document;
mod envelope;
mod funnel;
mod kind;
mod metadata;

pub use benchmarks::*;
pub use document::*;
pub use envelope::*;
pub use funnel::*;
pub use kind::*;
pub use metadata::*;
