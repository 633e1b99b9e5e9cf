//! Portfolio action ranking.
//!
//! Turns reallocations, per-source bottlenecks, critical market-wide signals
//! and failed sources into one ranked to-do list. Pure reduction; nothing is
//! re-fetched or re-analyzed.

use serde::{Deserialize, Serialize};

use funnelscope_core::{DiagnosticResult, Severity};

use crate::correlation::{Confidence, CrossPlatformKind, Correlation};
use crate::types::SourceOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ReallocateBudget,
    FixBottleneck,
    RespondToMarket,
    RestoreDataSource,
}

/// Ordered high → low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAction {
    /// 1-based position after ranking.
    pub rank: usize,
    pub kind: ActionKind,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_source: Option<String>,
    pub description: String,
    /// Estimated revenue delta this action addresses, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_revenue_impact: Option<f64>,
}

impl PortfolioAction {
    fn new(kind: ActionKind, priority: Priority, description: String) -> Self {
        Self {
            rank: 0,
            kind,
            priority,
            source: None,
            target_source: None,
            description,
            estimated_revenue_impact: None,
        }
    }

    fn impact_magnitude(&self) -> f64 {
        self.estimated_revenue_impact.map(f64::abs).unwrap_or(0.0)
    }
}

/// Rank actions by priority, then by absolute revenue impact (largest first).
pub fn rank_actions(outcomes: &[SourceOutcome], correlation: &Correlation) -> Vec<PortfolioAction> {
    let mut actions = Vec::new();

    for rec in &correlation.budget_recommendations {
        let priority = match rec.confidence {
            Confidence::High => Priority::High,
            Confidence::Medium => Priority::Medium,
        };
        let mut action = PortfolioAction::new(
            ActionKind::ReallocateBudget,
            priority,
            format!(
                "Shift {}% of budget from {} to {} ({})",
                rec.shift_percent, rec.from_source, rec.to_source, rec.rationale
            ),
        );
        action.source = Some(rec.from_source.clone());
        action.target_source = Some(rec.to_source.clone());
        actions.push(action);
    }

    for outcome in outcomes {
        match outcome {
            SourceOutcome::Success { source, result, .. } => {
                if let Some(action) = bottleneck_action(source, result) {
                    actions.push(action);
                }
            }
            SourceOutcome::Error { source, error, .. } => {
                let mut action = PortfolioAction::new(
                    ActionKind::RestoreDataSource,
                    Priority::Medium,
                    format!("Restore data access for {source}: {error}"),
                );
                action.source = Some(source.clone());
                actions.push(action);
            }
        }
    }

    for finding in &correlation.findings {
        if finding.kind == CrossPlatformKind::MarketWideCpmIncrease
            && finding.severity == Severity::Critical
        {
            actions.push(PortfolioAction::new(
                ActionKind::RespondToMarket,
                Priority::High,
                finding
                    .recommendation
                    .clone()
                    .unwrap_or_else(|| finding.message.clone()),
            ));
        }
    }

    actions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.impact_magnitude().total_cmp(&a.impact_magnitude()))
    });
    for (i, action) in actions.iter_mut().enumerate() {
        action.rank = i + 1;
    }
    actions
}

fn bottleneck_action(source: &str, result: &DiagnosticResult) -> Option<PortfolioAction> {
    let bottleneck = result.bottleneck.as_ref()?;
    let priority = match bottleneck.severity {
        Severity::Critical => Priority::High,
        Severity::Warning => Priority::Medium,
        Severity::Info | Severity::Healthy => Priority::Low,
    };

    // Prefer the elasticity entry; fall back to the stage's own impact.
    let impact = result
        .elasticity
        .as_ref()
        .and_then(|e| e.ranked.iter().find(|s| s.metric == bottleneck.metric))
        .and_then(|s| s.economic_impact)
        .or(bottleneck.economic_impact)
        .map(|i| i.revenue_delta);

    let mut description = format!(
        "Fix the {} stage on {} ({:+.1}%)",
        bottleneck.stage, source, bottleneck.delta_percent
    );
    if let Some(dollars) = impact {
        description.push_str(&format!(", est. revenue impact {:.0}", dollars));
    }

    let mut action = PortfolioAction::new(ActionKind::FixBottleneck, priority, description);
    action.source = Some(source.to_string());
    action.estimated_revenue_impact = impact;
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{BudgetRecommendation, CrossPlatformFinding};
    use chrono::NaiveDate;
    use funnelscope_core::{
        EconomicImpact, ElasticityRanking, PrimaryKpiSummary, StageDiagnostic, TimeRange,
    };

    fn stage(metric: &str, severity: Severity, revenue_delta: Option<f64>) -> StageDiagnostic {
        StageDiagnostic {
            stage: metric.to_string(),
            metric: metric.to_string(),
            current_value: 10.0,
            previous_value: 20.0,
            delta: -10.0,
            delta_percent: -50.0,
            is_significant: true,
            variance_source: None,
            severity,
            z_score: None,
            economic_impact: revenue_delta.map(|r| EconomicImpact {
                conversion_delta: -10.0,
                revenue_delta: r,
                revenue_impact_percent: 0.0,
            }),
        }
    }

    fn success(
        source: &str,
        bottleneck: Option<StageDiagnostic>,
        with_elasticity: bool,
    ) -> SourceOutcome {
        let d = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        let period = TimeRange::new(d, d).unwrap();
        let elasticity = with_elasticity.then(|| ElasticityRanking {
            ranked: bottleneck.clone().into_iter().collect(),
            total_revenue_loss: bottleneck
                .as_ref()
                .and_then(|b| b.economic_impact)
                .map(|i| i.revenue_delta)
                .unwrap_or(0.0),
        });
        SourceOutcome::Success {
            source: source.into(),
            entity_id: "act_1".into(),
            result: Box::new(DiagnosticResult {
                current_period: period,
                previous_period: period.preceding().unwrap(),
                spend: Default::default(),
                primary_kpi: PrimaryKpiSummary {
                    metric: "purchase".into(),
                    current_cost: 0.0,
                    previous_cost: 0.0,
                    delta_percent: 0.0,
                    severity: Severity::Healthy,
                    cost_missing: false,
                },
                stages: vec![],
                dropoffs: vec![],
                bottleneck,
                findings: vec![],
                efficiency: Default::default(),
                elasticity,
                maturity: None,
                source: Some(source.into()),
            }),
        }
    }

    #[test]
    fn ordered_by_priority_then_impact() {
        let outcomes = vec![
            success("meta", Some(stage("purchase", Severity::Critical, Some(-500.0))), true),
            success("google", Some(stage("conversions", Severity::Critical, Some(-2_000.0))), true),
            success("tiktok", Some(stage("add_to_cart", Severity::Info, None)), false),
            SourceOutcome::Error {
                source: "snap".into(),
                entity_id: "act_9".into(),
                error: "token expired".into(),
            },
        ];
        let correlation = Correlation {
            findings: vec![CrossPlatformFinding {
                kind: CrossPlatformKind::MarketWideCpmIncrease,
                severity: Severity::Critical,
                sources: vec!["meta".into(), "google".into()],
                message: "CPM up".into(),
                recommendation: Some("Hold budgets".into()),
            }],
            budget_recommendations: vec![BudgetRecommendation {
                from_source: "meta".into(),
                to_source: "google".into(),
                shift_percent: 12,
                confidence: Confidence::Medium,
                rationale: "meta worse".into(),
            }],
        };

        let actions = rank_actions(&outcomes, &correlation);
        let summary: Vec<_> = actions
            .iter()
            .map(|a| (a.rank, a.kind, a.source.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, ActionKind::FixBottleneck, Some("google")),
                (2, ActionKind::FixBottleneck, Some("meta")),
                (3, ActionKind::RespondToMarket, None),
                (4, ActionKind::ReallocateBudget, Some("meta")),
                (5, ActionKind::RestoreDataSource, Some("snap")),
                (6, ActionKind::FixBottleneck, Some("tiktok")),
            ]
        );
        assert_eq!(actions[0].estimated_revenue_impact, Some(-2_000.0));
        assert_eq!(actions[3].target_source.as_deref(), Some("google"));
    }

    #[test]
    fn warning_market_signal_is_not_an_action() {
        let correlation = Correlation {
            findings: vec![CrossPlatformFinding {
                kind: CrossPlatformKind::MarketWideCpmIncrease,
                severity: Severity::Warning,
                sources: vec![],
                message: "CPM up".into(),
                recommendation: None,
            }],
            budget_recommendations: vec![],
        };
        assert!(rank_actions(&[], &correlation).is_empty());
    }

    #[test]
    fn no_bottleneck_no_action() {
        let outcomes = vec![success("meta", None, false)];
        assert!(rank_actions(&outcomes, &Correlation::default()).is_empty());
    }
}
