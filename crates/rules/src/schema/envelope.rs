//! Document envelope for lightweight first-pass deserialization.

use serde::{Deserialize, Serialize};

use super::{BenchmarksDocument, DocumentKind, DocumentMetadata, FunnelDocument, RegistryDocument};

/// First-pass deserializer that reads only the header fields.
///
/// The loader extracts `kind` from the envelope, then reconstructs the
/// YAML and deserializes the concrete document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: DocumentMetadata,
    /// Remaining fields captured as raw YAML for second-pass deserialization.
    #[serde(flatten)]
    pub rest: serde_yaml::Value,
}

impl DocumentEnvelope {
    /// Parse the `kind` field into a typed [`DocumentKind`].
    pub fn document_kind(&self) -> std::result::Result<DocumentKind, String> {
        self.kind.parse()
    }

    /// Two-pass: reconstruct the full YAML and deserialize into the concrete type.
    pub fn parse_full(&self) -> std::result::Result<RegistryDocument, String> {
        let kind = self.document_kind()?;
        let yaml = serde_yaml::to_string(self).map_err(|e| e.to_string())?;
        match kind {
            DocumentKind::FunnelSchema => {
                let doc: FunnelDocument = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;
                Ok(RegistryDocument::Funnel(doc))
            }
            DocumentKind::VerticalBenchmarks => {
                let doc: BenchmarksDocument =
                    serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;
                Ok(RegistryDocument::Benchmarks(doc))
            }
        }
    }
}
