//! Normalized per-period metric snapshots.
//!
//! Snapshots are produced by platform clients and never mutated by the
//! analysis code. Counts and spend are clamped to zero on read so a
//! malformed upstream value cannot produce negative volumes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::funnel::FunnelSchema;
use crate::period::TimeRange;

/// Granularity of the entity a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLevel {
    Account,
    Campaign,
    AdSet,
    Ad,
}

impl std::fmt::Display for EntityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityLevel::Account => write!(f, "account"),
            EntityLevel::Campaign => write!(f, "campaign"),
            EntityLevel::AdSet => write!(f, "ad_set"),
            EntityLevel::Ad => write!(f, "ad"),
        }
    }
}

impl std::str::FromStr for EntityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "account" => Ok(EntityLevel::Account),
            "campaign" => Ok(EntityLevel::Campaign),
            "ad_set" | "adset" => Ok(EntityLevel::AdSet),
            "ad" => Ok(EntityLevel::Ad),
            other => Err(format!("unknown entity level: '{}'", other)),
        }
    }
}

/// Count and optional cost-per for one stage metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageMetric {
    pub count: f64,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl StageMetric {
    pub fn new(count: f64, cost: Option<f64>) -> Self {
        Self { count, cost }
    }
}

// ── Top-level metric bag ─────────────────────────────────────────────

/// Well-known top-level keys.
pub mod keys {
    pub const CPM: &str = "cpm";
    pub const CTR: &str = "ctr";
    pub const ROAS: &str = "roas";
    pub const REVENUE: &str = "revenue";
    pub const CONVERSION_VALUE: &str = "conversion_value";
    pub const IMPRESSIONS: &str = "impressions";
    pub const CLICKS: &str = "clicks";
    pub const FREQUENCY: &str = "frequency";
    pub const BID_STRATEGY: &str = "bid_strategy";
}

/// Free-form derived metrics reported alongside the funnel counts
/// (ctr, cpm, roas, frequency, `roas_<action>`, bid strategy code, ...).
///
/// Values are kept as raw JSON so string codes survive; numeric reads go
/// through [`TopLevelMetrics::number`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopLevelMetrics(pub BTreeMap<String, serde_json::Value>);

impl TopLevelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Numeric value for `key`. Numeric strings are accepted since some
    /// platforms report every field as text.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Aggregate metrics for one entity over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub entity_id: String,
    pub entity_level: EntityLevel,
    pub period: TimeRange,
    pub spend: f64,
    #[serde(default)]
    pub stages: HashMap<String, StageMetric>,
    #[serde(default)]
    pub top_level: TopLevelMetrics,
}

impl MetricSnapshot {
    /// Zero-filled snapshot for a period with no data.
    pub fn empty(entity_id: &str, entity_level: EntityLevel, period: TimeRange) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_level,
            period,
            spend: 0.0,
            stages: HashMap::new(),
            top_level: TopLevelMetrics::new(),
        }
    }

    pub fn with_stage(mut self, metric: &str, count: f64, cost: Option<f64>) -> Self {
        self.stages.insert(metric.to_string(), StageMetric::new(count, cost));
        self
    }

    pub fn with_spend(mut self, spend: f64) -> Self {
        self.spend = spend;
        self
    }

    pub fn with_top_level(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.top_level.insert(key, value);
        self
    }

    /// Spend, never negative.
    pub fn spend(&self) -> f64 {
        self.spend.max(0.0)
    }

    /// Stage count; missing metrics read as zero.
    pub fn count(&self, metric: &str) -> f64 {
        self.stages
            .get(metric)
            .map(|m| m.count.max(0.0))
            .unwrap_or(0.0)
    }

    /// Stage cost-per; missing metrics or costs read as `None`.
    pub fn cost(&self, metric: &str) -> Option<f64> {
        self.stages.get(metric).and_then(|m| m.cost)
    }

    /// Impressions: top-level `impressions`, then the `impressions` stage.
    fn impressions(&self) -> f64 {
        self.top_level
            .number(keys::IMPRESSIONS)
            .unwrap_or_else(|| self.count(keys::IMPRESSIONS))
            .max(0.0)
    }

    /// Clicks: top-level `clicks`, then the `clicks` stage.
    fn clicks(&self) -> f64 {
        self.top_level
            .number(keys::CLICKS)
            .unwrap_or_else(|| self.count(keys::CLICKS))
            .max(0.0)
    }

    /// CPM: `cpm`, then `spend / impressions * 1000`, then 0.
    pub fn cpm(&self) -> f64 {
        if let Some(cpm) = self.top_level.number(keys::CPM) {
            return cpm;
        }
        let impressions = self.impressions();
        if impressions > 0.0 {
            self.spend() / impressions * 1000.0
        } else {
            0.0
        }
    }

    /// CTR in percent: `ctr`, then `clicks / impressions * 100`, then 0.
    pub fn ctr(&self) -> f64 {
        if let Some(ctr) = self.top_level.number(keys::CTR) {
            return ctr;
        }
        let impressions = self.impressions();
        if impressions > 0.0 {
            self.clicks() / impressions * 100.0
        } else {
            0.0
        }
    }

    /// ROAS: the funnel's `roas_metric` key, then `roas`, then
    /// `revenue / spend`, then 0.
    pub fn roas(&self, funnel: &FunnelSchema) -> f64 {
        if let Some(roas) = self.reported_roas(funnel) {
            return roas;
        }
        let spend = self.spend();
        match self.top_level.number(keys::REVENUE) {
            Some(revenue) if spend > 0.0 => revenue / spend,
            _ => 0.0,
        }
    }

    /// Revenue: `revenue`, then `conversion_value`, then reported ROAS
    /// times spend, then 0.
    pub fn revenue(&self, funnel: &FunnelSchema) -> f64 {
        self.top_level
            .number(keys::REVENUE)
            .or_else(|| self.top_level.number(keys::CONVERSION_VALUE))
            .or_else(|| self.reported_roas(funnel).map(|roas| roas * self.spend()))
            .unwrap_or(0.0)
            .max(0.0)
    }

    fn reported_roas(&self, funnel: &FunnelSchema) -> Option<f64> {
        funnel
            .roas_metric
            .as_deref()
            .and_then(|key| self.top_level.number(key))
            .or_else(|| self.top_level.number(keys::ROAS))
    }
}
