//! Executive summary of one orchestration run.

use std::fmt;

use serde::{Deserialize, Serialize};

use funnelscope_core::Severity;

use crate::correlation::Correlation;
use crate::portfolio::PortfolioAction;
use crate::types::SourceOutcome;

/// How many ranked actions the summary repeats.
const TOP_ACTIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub headline: String,
    pub sources_analyzed: usize,
    pub sources_failed: usize,
    pub critical_findings: usize,
    pub warning_findings: usize,
    /// Sum of elasticity revenue losses across sources; always <= 0.
    pub revenue_at_risk: f64,
    pub highlights: Vec<String>,
    pub top_actions: Vec<String>,
}

/// Reduce outcomes, correlation and ranked actions into a summary.
pub fn summarize(
    outcomes: &[SourceOutcome],
    correlation: &Correlation,
    actions: &[PortfolioAction],
) -> ExecutiveSummary {
    let mut summary = ExecutiveSummary::default();
    let mut highlights = Vec::new();

    for outcome in outcomes {
        match outcome {
            SourceOutcome::Success { source, result, .. } => {
                summary.sources_analyzed += 1;
                let critical = result.count_findings(Severity::Critical);
                summary.critical_findings += critical;
                summary.warning_findings += result.count_findings(Severity::Warning);
                if let Some(elasticity) = &result.elasticity {
                    summary.revenue_at_risk += elasticity.total_revenue_loss;
                }

                let kpi = &result.primary_kpi;
                let mut line = format!(
                    "{}: cost per {} {:+.1}% ({})",
                    source, kpi.metric, kpi.delta_percent, kpi.severity
                );
                if let Some(b) = &result.bottleneck {
                    line.push_str(&format!(", bottleneck {} {:+.1}%", b.stage, b.delta_percent));
                }
                if critical > 0 {
                    line.push_str(&format!(", {critical} critical"));
                }
                highlights.push(line);
            }
            SourceOutcome::Error { source, error, .. } => {
                summary.sources_failed += 1;
                highlights.push(format!("{source}: unavailable ({error})"));
            }
        }
    }

    highlights.extend(correlation.findings.iter().map(|f| f.message.clone()));

    summary.headline = headline(&summary);
    summary.highlights = highlights;
    summary.top_actions = actions
        .iter()
        .take(TOP_ACTIONS)
        .map(|a| format!("{}. {}", a.rank, a.description))
        .collect();
    summary
}

fn headline(s: &ExecutiveSummary) -> String {
    let total = s.sources_analyzed + s.sources_failed;
    let mut headline = if s.critical_findings > 0 {
        format!(
            "{} critical issue(s) across {}/{} sources",
            s.critical_findings, s.sources_analyzed, total
        )
    } else if s.warning_findings > 0 {
        format!(
            "{} warning(s) across {}/{} sources",
            s.warning_findings, s.sources_analyzed, total
        )
    } else if s.sources_analyzed > 0 {
        format!("{}/{} sources healthy", s.sources_analyzed, total)
    } else {
        "No sources could be analyzed".to_string()
    };
    if s.revenue_at_risk < 0.0 {
        headline.push_str(&format!("; est. revenue at risk {:.0}", s.revenue_at_risk.abs()));
    }
    headline
}

impl fmt::Display for ExecutiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline)?;
        if self.sources_failed > 0 {
            writeln!(f, "({} source(s) failed)", self.sources_failed)?;
        }
        if !self.highlights.is_empty() {
            writeln!(f)?;
            for line in &self.highlights {
                writeln!(f, "  - {line}")?;
            }
        }
        if !self.top_actions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top actions:")?;
            for line in &self.top_actions {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}
