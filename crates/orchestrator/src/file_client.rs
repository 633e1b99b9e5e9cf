//! File-backed platform client.
//!
//! Reads normalized snapshot JSON exported by an upstream job:
//!
//! ```text
//! <root>/<source>/<entity_id>/<since>_<until>.json
//! <root>/<source>/<entity_id>/breakdowns/<since>_<until>.json
//! ```
//!
//! A missing snapshot file is a period without data and yields a zero-filled
//! snapshot. A missing breakdown file yields empty breakdowns.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use funnelscope_core::{
    EntityLevel, FunnelSchema, MetricSnapshot, PlatformError, StageMetric, TimeRange,
    TopLevelMetrics,
};

use crate::client::{PlatformClient, SubEntityBreakdowns};

/// On-disk shape of one snapshot. Identity fields come from the path.
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    spend: f64,
    #[serde(default)]
    stages: HashMap<String, StageMetric>,
    #[serde(default)]
    top_level: TopLevelMetrics,
}

/// Serves one source's snapshots from a directory tree.
#[derive(Debug, Clone)]
pub struct FileClient {
    root: PathBuf,
    source: String,
}

impl FileClient {
    pub fn new(root: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            source: source.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entity_dir(&self, entity_id: &str) -> Result<PathBuf, PlatformError> {
        if entity_id.is_empty() || entity_id.contains(['/', '\\']) || entity_id.starts_with('.') {
            return Err(PlatformError::Fetch(format!("invalid entity id '{}'", entity_id)));
        }
        Ok(self.root.join(&self.source).join(entity_id))
    }

    fn file_name(range: &TimeRange) -> String {
        format!("{}_{}.json", range.since, range.until)
    }

    /// File contents, or `None` when the file does not exist.
    async fn read_optional(path: &Path) -> Result<Option<String>, PlatformError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no data file, treating period as empty");
                Ok(None)
            }
            Err(e) => Err(PlatformError::Io(e)),
        }
    }
}

#[async_trait]
impl PlatformClient for FileClient {
    fn source_name(&self) -> &str {
        &self.source
    }

    async fn fetch_snapshot(
        &self,
        entity_id: &str,
        entity_level: EntityLevel,
        range: &TimeRange,
        funnel: &FunnelSchema,
    ) -> Result<MetricSnapshot, PlatformError> {
        let path = self.entity_dir(entity_id)?.join(Self::file_name(range));
        let file = match Self::read_optional(&path).await? {
            Some(text) => serde_json::from_str::<SnapshotFile>(&text)
                .map_err(|e| PlatformError::Decode(format!("{}: {}", path.display(), e)))?,
            None => SnapshotFile::default(),
        };

        let mut snapshot =
            MetricSnapshot::empty(entity_id, entity_level, *range).with_spend(file.spend);
        snapshot.stages = file.stages;
        snapshot.top_level = file.top_level;
        for stage in &funnel.stages {
            snapshot.stages.entry(stage.metric.clone()).or_default();
        }
        Ok(snapshot)
    }

    fn supports_sub_entity_breakdowns(&self) -> bool {
        true
    }

    async fn fetch_sub_entity_breakdowns(
        &self,
        entity_id: &str,
        _entity_level: EntityLevel,
        range: &TimeRange,
        _funnel: &FunnelSchema,
    ) -> Result<SubEntityBreakdowns, PlatformError> {
        let path = self
            .entity_dir(entity_id)?
            .join("breakdowns")
            .join(Self::file_name(range));
        match Self::read_optional(&path).await? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| PlatformError::Decode(format!("{}: {}", path.display(), e))),
            None => Ok(SubEntityBreakdowns::default()),
        }
    }
}
