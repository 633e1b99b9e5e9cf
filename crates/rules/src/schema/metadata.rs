//! Metadata shared by every registry document.

use serde::{Deserialize, Serialize};

/// Identity and scope of a registry document.
///
/// `vertical` is required. `source` narrows a document to one ad platform;
/// benchmarks without a source apply to every platform in the vertical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DocumentMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    pub vertical: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl DocumentMetadata {
    /// Whether this document applies to the pair, ignoring precedence.
    pub fn applies_to(&self, source: &str, vertical: &str) -> bool {
        self.enabled
            && self.vertical == vertical
            && self.source.as_deref().map_or(true, |s| s == source)
    }
}

pub(crate) fn default_true() -> bool {
    true
}
