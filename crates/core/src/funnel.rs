//! Funnel definitions and vertical benchmarks.
//!
//! Both are read-only configuration: built once by the registry and
//! consumed by the walker and the economics model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default benchmark variance (percent) when a vertical does not declare one.
pub const DEFAULT_VARIANCE_PERCENT: f64 = 15.0;

/// Where a stage sits in the funnel, used to attenuate economic impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelPosition {
    Impression,
    Click,
    Conversion,
}

/// One step of the conversion path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunnelStage {
    pub name: String,
    /// Key into [`crate::MetricSnapshot::stages`].
    pub metric: String,
    /// Which upstream report the metric comes from (e.g. `insights`, `actions`).
    pub source: String,
    #[serde(default)]
    pub cost_metric: Option<String>,
    #[serde(default)]
    pub cost_source: Option<String>,
    /// Explicit position; inferred from the metric key when absent.
    #[serde(default)]
    pub position: Option<FunnelPosition>,
}

impl FunnelStage {
    pub fn new(name: &str, metric: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            metric: metric.to_string(),
            source: source.to_string(),
            cost_metric: None,
            cost_source: None,
            position: None,
        }
    }

    pub fn with_position(mut self, position: FunnelPosition) -> Self {
        self.position = Some(position);
        self
    }
}

/// Ordered funnel for one (source, vertical) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunnelSchema {
    pub stages: Vec<FunnelStage>,
    /// Metric key of the bottom-of-funnel KPI; its cost is the headline number.
    pub primary_kpi: String,
    #[serde(default)]
    pub roas_metric: Option<String>,
}

impl FunnelSchema {
    pub fn stage(&self, metric: &str) -> Option<&FunnelStage> {
        self.stages.iter().find(|s| s.metric == metric)
    }

    /// The top-of-funnel stage.
    pub fn awareness_stage(&self) -> Option<&FunnelStage> {
        self.stages.first()
    }

    /// Resolve a stage's funnel position.
    ///
    /// Explicit positions win. Otherwise the primary KPI is the conversion
    /// stage, impression/reach metrics are impression level, and every other
    /// stage is treated as click level.
    pub fn position_of(&self, stage: &FunnelStage) -> FunnelPosition {
        if let Some(position) = stage.position {
            return position;
        }
        if stage.metric == self.primary_kpi {
            return FunnelPosition::Conversion;
        }
        let metric = stage.metric.to_ascii_lowercase();
        if metric.contains("impression") || metric.contains("reach") {
            FunnelPosition::Impression
        } else {
            FunnelPosition::Click
        }
    }
}

/// Benchmark values for one stage metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageBenchmark {
    /// Typical period-over-period variance, in percent.
    #[serde(default)]
    pub variance_percent: Option<f64>,
    #[serde(default)]
    pub typical_conversion_rate: Option<f64>,
}

/// Static per-vertical benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerticalBenchmarks {
    #[serde(default = "default_variance")]
    pub default_variance_percent: f64,
    #[serde(default)]
    pub stages: IndexMap<String, StageBenchmark>,
}

fn default_variance() -> f64 {
    DEFAULT_VARIANCE_PERCENT
}

impl Default for VerticalBenchmarks {
    fn default() -> Self {
        Self {
            default_variance_percent: DEFAULT_VARIANCE_PERCENT,
            stages: IndexMap::new(),
        }
    }
}

impl VerticalBenchmarks {
    /// Stage-specific variance only; `None` means no benchmark for this metric.
    pub fn stage_variance(&self, metric: &str) -> Option<f64> {
        self.stages.get(metric).and_then(|b| b.variance_percent)
    }
}
