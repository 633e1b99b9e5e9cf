//! `kind: VerticalBenchmarks` documents.

use serde::{Deserialize, Serialize};

use funnelscope_core::VerticalBenchmarks;

use super::DocumentMetadata;

/// Static variance and conversion-rate benchmarks for a vertical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchmarksDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub spec: VerticalBenchmarks,
}
