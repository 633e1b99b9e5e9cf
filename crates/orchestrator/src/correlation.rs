//! Cross-source correlation.
//!
//! A pure reduction over the successful per-source results: market-wide
//! auction pressure, halo effects between sources, and conflicting
//! performance that suggests moving budget.

use serde::{Deserialize, Serialize};
use tracing::debug;

use funnelscope_core::{DiagnosticResult, Severity};

/// Every source's CPM must rise more than this (percent).
pub const MARKET_CPM_INCREASE_PERCENT: f64 = 15.0;
/// Average CPM increase above which the market-wide finding is critical.
pub const MARKET_CPM_CRITICAL_PERCENT: f64 = 40.0;
/// Spend growth on the lifting source for a halo effect.
pub const HALO_SPEND_INCREASE_PERCENT: f64 = 20.0;
/// Primary-KPI cost below this delta counts as improving.
pub const IMPROVING_KPI_PERCENT: f64 = -10.0;
/// Primary-KPI cost above this delta counts as worsening.
pub const WORSENING_KPI_PERCENT: f64 = 15.0;
/// Reallocations never move more than this share of budget.
pub const MAX_SHIFT_PERCENT: f64 = 30.0;
const HIGH_CONFIDENCE_WORSENING: f64 = 30.0;
const HIGH_CONFIDENCE_IMPROVING: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossPlatformKind {
    MarketWideCpmIncrease,
    HaloEffect,
    PerformanceConflict,
}

/// A finding that only exists when comparing two or more sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossPlatformFinding {
    pub kind: CrossPlatformKind,
    pub severity: Severity,
    pub sources: Vec<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
}

/// Suggested budget move from a worsening source to an improving one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub from_source: String,
    pub to_source: String,
    pub shift_percent: u32,
    pub confidence: Confidence,
    pub rationale: String,
}

/// Everything correlation produces for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub findings: Vec<CrossPlatformFinding>,
    pub budget_recommendations: Vec<BudgetRecommendation>,
}

impl Correlation {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.budget_recommendations.is_empty()
    }
}

fn source_label(result: &DiagnosticResult) -> &str {
    result.source.as_deref().unwrap_or("unknown")
}

/// Correlate successful results. Fewer than two results yield nothing.
pub fn correlate(results: &[&DiagnosticResult]) -> Correlation {
    if results.len() < 2 {
        return Correlation::default();
    }

    let mut findings = Vec::new();
    findings.extend(market_wide_cpm(results));
    findings.extend(halo_effects(results));
    let (conflict, budget_recommendations) = conflicts(results);
    findings.extend(conflict);

    debug!(
        sources = results.len(),
        findings = findings.len(),
        reallocations = budget_recommendations.len(),
        "correlation complete"
    );

    Correlation {
        findings,
        budget_recommendations,
    }
}

/// One finding when every source's CPM rose more than the threshold.
fn market_wide_cpm(results: &[&DiagnosticResult]) -> Option<CrossPlatformFinding> {
    let deltas: Vec<f64> = results.iter().map(|r| r.efficiency.cpm.delta_percent).collect();
    if !deltas.iter().all(|d| *d > MARKET_CPM_INCREASE_PERCENT) {
        return None;
    }
    let average = deltas.iter().sum::<f64>() / deltas.len() as f64;
    let severity = if average > MARKET_CPM_CRITICAL_PERCENT {
        Severity::Critical
    } else {
        Severity::Warning
    };
    Some(CrossPlatformFinding {
        kind: CrossPlatformKind::MarketWideCpmIncrease,
        severity,
        sources: results.iter().map(|r| source_label(r).to_string()).collect(),
        message: format!(
            "CPM rose on every platform (average {:+.1}%); auction costs are up market-wide, not on one account",
            average
        ),
        recommendation: Some(
            "Hold budgets steady and judge performance on relative efficiency until auction pressure eases".to_string(),
        ),
    })
}

/// Ordered pairs where A scaled spend and B got cheaper.
fn halo_effects(results: &[&DiagnosticResult]) -> Vec<CrossPlatformFinding> {
    let mut findings = Vec::new();
    for a in results {
        for b in results {
            if std::ptr::eq(*a, *b) {
                continue;
            }
            let spend_delta = a.spend.delta_percent;
            let kpi_delta = b.primary_kpi.delta_percent;
            if spend_delta > HALO_SPEND_INCREASE_PERCENT && kpi_delta < IMPROVING_KPI_PERCENT {
                let (from, to) = (source_label(a), source_label(b));
                findings.push(CrossPlatformFinding {
                    kind: CrossPlatformKind::HaloEffect,
                    severity: Severity::Info,
                    sources: vec![from.to_string(), to.to_string()],
                    message: format!(
                        "{from} spend rose {spend_delta:+.1}% while {to} cost per {} moved {kpi_delta:+.1}%; {from} may be lifting {to}",
                        b.primary_kpi.metric
                    ),
                    recommendation: Some(format!(
                        "Credit part of the {to} improvement to {from} before cutting {from} spend"
                    )),
                });
            }
        }
    }
    findings
}

/// Improving vs worsening sources: one conflict finding plus a reallocation
/// per (worsening, improving) pair.
fn conflicts(
    results: &[&DiagnosticResult],
) -> (Option<CrossPlatformFinding>, Vec<BudgetRecommendation>) {
    let improving: Vec<_> = results
        .iter()
        .filter(|r| r.primary_kpi.delta_percent < IMPROVING_KPI_PERCENT)
        .collect();
    let worsening: Vec<_> = results
        .iter()
        .filter(|r| r.primary_kpi.delta_percent > WORSENING_KPI_PERCENT)
        .collect();

    if improving.is_empty() || worsening.is_empty() {
        return (None, Vec::new());
    }

    let mut recommendations = Vec::new();
    for w in &worsening {
        for i in &improving {
            let w_delta = w.primary_kpi.delta_percent.abs();
            let i_delta = i.primary_kpi.delta_percent.abs();
            let shift_percent = ((w_delta + i_delta) / 4.0).round().min(MAX_SHIFT_PERCENT) as u32;
            let confidence = if w_delta > HIGH_CONFIDENCE_WORSENING
                && i_delta > HIGH_CONFIDENCE_IMPROVING
            {
                Confidence::High
            } else {
                Confidence::Medium
            };
            recommendations.push(BudgetRecommendation {
                from_source: source_label(w).to_string(),
                to_source: source_label(i).to_string(),
                shift_percent,
                confidence,
                rationale: format!(
                    "{} cost per {} {:+.1}% vs {} {:+.1}%",
                    source_label(w),
                    w.primary_kpi.metric,
                    w.primary_kpi.delta_percent,
                    source_label(i),
                    i.primary_kpi.delta_percent
                ),
            });
        }
    }

    let finding = CrossPlatformFinding {
        kind: CrossPlatformKind::PerformanceConflict,
        severity: Severity::Warning,
        sources: worsening
            .iter()
            .chain(improving.iter())
            .map(|r| source_label(r).to_string())
            .collect(),
        message: format!(
            "Platforms are diverging: worsening on {} while improving on {}",
            names(&worsening),
            names(&improving)
        ),
        recommendation: Some(
            "Shift budget toward the improving platforms (see budget recommendations)".to_string(),
        ),
    };

    (Some(finding), recommendations)
}

fn names(set: &[&&DiagnosticResult]) -> String {
    set.iter().map(|r| source_label(r)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use funnelscope_core::{
        EfficiencyMetrics, MetricComparison, PrimaryKpiSummary, TimeRange,
    };

    fn comparison(delta_percent: f64) -> MetricComparison {
        MetricComparison {
            current: 0.0,
            previous: 0.0,
            delta_percent,
        }
    }

    fn result(source: &str, cpm: f64, spend: f64, kpi: f64) -> DiagnosticResult {
        let d = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        let period = TimeRange::new(d, d).unwrap();
        DiagnosticResult {
            current_period: period,
            previous_period: period.preceding().unwrap(),
            spend: comparison(spend),
            primary_kpi: PrimaryKpiSummary {
                metric: "purchase".into(),
                current_cost: 0.0,
                previous_cost: 0.0,
                delta_percent: kpi,
                severity: Severity::Healthy,
                cost_missing: false,
            },
            stages: vec![],
            dropoffs: vec![],
            bottleneck: None,
            findings: vec![],
            efficiency: EfficiencyMetrics {
                cpm: comparison(cpm),
                ..Default::default()
            },
            elasticity: None,
            maturity: None,
            source: Some(source.into()),
        }
    }

    fn count(c: &Correlation, kind: CrossPlatformKind) -> usize {
        c.findings.iter().filter(|f| f.kind == kind).count()
    }

    #[test]
    fn single_source_never_correlates() {
        let a = result("meta", 80.0, 50.0, 40.0);
        assert!(correlate(&[&a]).is_empty());
    }

    #[test]
    fn market_wide_when_every_cpm_rises() {
        let a = result("meta", 20.0, 0.0, 0.0);
        let b = result("google", 18.0, 0.0, 0.0);
        let c = correlate(&[&a, &b]);
        assert_eq!(count(&c, CrossPlatformKind::MarketWideCpmIncrease), 1);
        let finding = &c.findings[0];
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.sources, vec!["meta", "google"]);
    }

    #[test]
    fn no_market_wide_when_one_source_is_flat() {
        let a = result("meta", 25.0, 0.0, 0.0);
        let b = result("google", 5.0, 0.0, 0.0);
        assert_eq!(count(&correlate(&[&a, &b]), CrossPlatformKind::MarketWideCpmIncrease), 0);
    }

    #[test]
    fn market_wide_critical_above_forty_average() {
        let a = result("meta", 60.0, 0.0, 0.0);
        let b = result("google", 30.0, 0.0, 0.0);
        let c = correlate(&[&a, &b]);
        assert_eq!(c.findings[0].severity, Severity::Critical);
    }

    #[test]
    fn halo_is_directional() {
        // meta scaled spend; google got cheaper. Not the reverse.
        let a = result("meta", 0.0, 35.0, 0.0);
        let b = result("google", 0.0, 0.0, -12.0);
        let c = correlate(&[&a, &b]);
        assert_eq!(count(&c, CrossPlatformKind::HaloEffect), 1);
        let halo = c.findings.iter().find(|f| f.kind == CrossPlatformKind::HaloEffect).unwrap();
        assert_eq!(halo.sources, vec!["meta", "google"]);
        assert_eq!(halo.severity, Severity::Info);
    }

    #[test]
    fn conflict_yields_one_finding_and_pairwise_reallocations() {
        let worse_a = result("meta", 0.0, 0.0, 40.0);
        let worse_b = result("tiktok", 0.0, 0.0, 16.0);
        let better = result("google", 0.0, 0.0, -25.0);
        let c = correlate(&[&worse_a, &better, &worse_b]);

        assert_eq!(count(&c, CrossPlatformKind::PerformanceConflict), 1);
        assert_eq!(c.budget_recommendations.len(), 2);

        let first = &c.budget_recommendations[0];
        assert_eq!(first.from_source, "meta");
        assert_eq!(first.to_source, "google");
        // round((40 + 25) / 4) = 16
        assert_eq!(first.shift_percent, 16);
        assert_eq!(first.confidence, Confidence::High);

        let second = &c.budget_recommendations[1];
        assert_eq!(second.from_source, "tiktok");
        // round((16 + 25) / 4) = 10
        assert_eq!(second.shift_percent, 10);
        assert_eq!(second.confidence, Confidence::Medium);
    }

    #[test]
    fn shift_is_capped() {
        let worse = result("meta", 0.0, 0.0, 150.0);
        let better = result("google", 0.0, 0.0, -60.0);
        let c = correlate(&[&worse, &better]);
        assert_eq!(c.budget_recommendations[0].shift_percent, 30);
    }

    #[test]
    fn no_conflict_without_both_sides() {
        let a = result("meta", 0.0, 0.0, 40.0);
        let b = result("google", 0.0, 0.0, 5.0);
        let c = correlate(&[&a, &b]);
        assert_eq!(count(&c, CrossPlatformKind::PerformanceConflict), 0);
        assert!(c.budget_recommendations.is_empty());
    }
}
