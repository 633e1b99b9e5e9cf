//! Multi-source funnel diagnosis.
//!
//! This crate provides:
//! - `PlatformClient` trait for pluggable ad-platform data sources
//! - Diagnostic context assembly (history, breakdowns, revenue)
//! - `Orchestrator` running one funnel walk per source with failure isolation
//! - Cross-source correlation, portfolio action ranking, executive summary
//! - A file-backed client reading normalized snapshot JSON

pub mod client;
pub mod concurrency;
pub mod context;
pub mod correlation;
pub mod file_client;
pub mod orchestrator;
pub mod portfolio;
pub mod summary;
pub mod types;

pub use client::{ComparisonSnapshots, PlatformClient, SubEntityBreakdowns};
pub use context::{ContextBuilder, ContextOptions};
pub use file_client::FileClient;
pub use orchestrator::{OrchestrationRequest, Orchestrator, SourceConfig};
pub use types::{MultiPlatformResult, SourceOutcome};
