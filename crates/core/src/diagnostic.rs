//! Output of one funnel-walker pass.
//!
//! Everything here is plain data, produced fresh on every walk and safe
//! to serialize directly.

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, Severity};
use crate::period::TimeRange;

/// Estimated dollar effect of a volume or rate change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicImpact {
    /// Change in (estimated) conversions, after funnel-position attenuation.
    pub conversion_delta: f64,
    pub revenue_delta: f64,
    /// Revenue delta relative to previous total revenue, in percent.
    pub revenue_impact_percent: f64,
}

/// Where the variance behind a significance test came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceSource {
    /// Coefficient of variation of the entity's own trailing history.
    Account,
    /// The vertical's benchmark for this stage metric.
    StageBenchmark,
    /// The vertical's default variance.
    VerticalDefault,
}

/// Period-over-period comparison of one funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostic {
    pub stage: String,
    pub metric: String,
    pub current_value: f64,
    pub previous_value: f64,
    pub delta: f64,
    pub delta_percent: f64,
    pub is_significant: bool,
    /// `None` when significance fell back to the spend-scaled minimum
    /// detectable effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_source: Option<VarianceSource>,
    pub severity: Severity,
    /// Standard score of the current value against trailing history, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economic_impact: Option<EconomicImpact>,
}

/// Conversion rate between two adjacent stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelDropoff {
    pub from_stage: String,
    pub to_stage: String,
    pub current_rate: f64,
    pub previous_rate: f64,
    pub delta_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economic_impact: Option<EconomicImpact>,
}

/// Cost-per-primary-KPI comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKpiSummary {
    pub metric: String,
    pub current_cost: f64,
    pub previous_cost: f64,
    pub delta_percent: f64,
    pub severity: Severity,
    /// Set when either period reported no cost. The delta is then 0 and the
    /// severity `Info`; the comparison says nothing about efficiency.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cost_missing: bool,
}

/// A generic current/previous pair with its percent change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub current: f64,
    pub previous: f64,
    pub delta_percent: f64,
}

/// Derived efficiency metrics, resolved through the snapshot fallback chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub cpm: MetricComparison,
    pub ctr: MetricComparison,
    pub roas: MetricComparison,
}

/// Stages ranked by dollar impact, worst first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticityRanking {
    pub ranked: Vec<StageDiagnostic>,
    /// Sum of the ranked revenue deltas; always <= 0.
    pub total_revenue_loss: f64,
}

/// How complete the compared periods' data is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaturityAssessment {
    pub current: f64,
    pub previous: f64,
    /// Absolute maturity gap in percentage points.
    pub gap_points: f64,
    pub comparison_unsafe: bool,
}

/// Full result of one funnel-walker pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub current_period: TimeRange,
    pub previous_period: TimeRange,
    pub spend: MetricComparison,
    pub primary_kpi: PrimaryKpiSummary,
    pub stages: Vec<StageDiagnostic>,
    pub dropoffs: Vec<FunnelDropoff>,
    pub bottleneck: Option<StageDiagnostic>,
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub efficiency: EfficiencyMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticity: Option<ElasticityRanking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity: Option<MaturityAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DiagnosticResult {
    pub fn count_findings(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}
