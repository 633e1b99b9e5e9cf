//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported registry document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    FunnelSchema,
    VerticalBenchmarks,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::FunnelSchema => write!(f, "FunnelSchema"),
            DocumentKind::VerticalBenchmarks => write!(f, "VerticalBenchmarks"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FunnelSchema" => Ok(DocumentKind::FunnelSchema),
            "VerticalBenchmarks" => Ok(DocumentKind::VerticalBenchmarks),
            other => Err(format!("unknown document kind: '{}'", other)),
        }
    }
}
