//! Auxiliary data advisors and the economics model may consume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::MetricSnapshot;

/// Revenue figures extracted from the compared snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueData {
    /// Total revenue / primary-KPI conversions; `None` when either is zero.
    pub average_order_value: Option<f64>,
    pub total_revenue: f64,
    pub previous_total_revenue: f64,
}

/// One row of a placement/device/ad/daily breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub key: String,
    pub spend: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub conversions: f64,
}

/// Dimensional breakdowns for the current window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    #[serde(default)]
    pub placement: Vec<BreakdownRow>,
    #[serde(default)]
    pub device: Vec<BreakdownRow>,
    #[serde(default)]
    pub ad: Vec<BreakdownRow>,
    #[serde(default)]
    pub daily: Vec<BreakdownRow>,
}

impl Breakdowns {
    pub fn is_empty(&self) -> bool {
        self.placement.is_empty()
            && self.device.is_empty()
            && self.ad.is_empty()
            && self.daily.is_empty()
    }
}

/// Share of audience two entities have in common.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceOverlap {
    pub first: String,
    pub second: String,
    pub overlap_percent: f64,
}

/// Optional context for one diagnostic run. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticContext {
    /// Trailing snapshots, most recent first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub historical: Vec<MetricSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_entities: Vec<MetricSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueData>,
    #[serde(default)]
    pub breakdowns: Breakdowns,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_overlap: Vec<AudienceOverlap>,
    /// Attribution window name (e.g. `7d_click`) → reported conversions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attribution_windows: BTreeMap<String, f64>,
}

impl DiagnosticContext {
    pub fn is_empty(&self) -> bool {
        self.historical.is_empty()
            && self.sub_entities.is_empty()
            && self.revenue.is_none()
            && self.breakdowns.is_empty()
            && self.audience_overlap.is_empty()
            && self.attribution_windows.is_empty()
    }

    /// Average order value, if the revenue data could establish one.
    pub fn average_order_value(&self) -> Option<f64> {
        self.revenue.and_then(|r| r.average_order_value)
    }

    /// Historical counts for one stage metric, most recent first.
    pub fn history_for(&self, metric: &str) -> Vec<f64> {
        self.historical.iter().map(|s| s.count(metric)).collect()
    }
}
