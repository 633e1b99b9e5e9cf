//! `kind: FunnelSchema` documents.

use serde::{Deserialize, Serialize};

use funnelscope_core::FunnelSchema;

use super::DocumentMetadata;

/// An ordered funnel for one platform and vertical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FunnelDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: DocumentMetadata,
    pub spec: FunnelSchema,
}
