//! Orchestration output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use funnelscope_core::{ComparisonPeriods, DiagnosticResult};

use crate::correlation::{BudgetRecommendation, CrossPlatformFinding};
use crate::portfolio::PortfolioAction;
use crate::summary::ExecutiveSummary;

/// Per-source outcome. A failed source carries its error instead of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Success {
        source: String,
        entity_id: String,
        result: Box<DiagnosticResult>,
    },
    Error {
        source: String,
        entity_id: String,
        error: String,
    },
}

impl SourceOutcome {
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Success { source, .. } | SourceOutcome::Error { source, .. } => {
                source.as_str()
            }
        }
    }

    pub fn result(&self) -> Option<&DiagnosticResult> {
        match self {
            SourceOutcome::Success { result, .. } => Some(result.as_ref()),
            SourceOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SourceOutcome::Error { error, .. } => Some(error.as_str()),
            SourceOutcome::Success { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Success { .. })
    }
}

/// Result of one multi-source run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiPlatformResult {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub periods: ComparisonPeriods,
    /// In source-declaration order.
    pub sources: Vec<SourceOutcome>,
    pub cross_platform_findings: Vec<CrossPlatformFinding>,
    pub budget_recommendations: Vec<BudgetRecommendation>,
    pub portfolio_actions: Vec<PortfolioAction>,
    pub executive_summary: ExecutiveSummary,
}

impl MultiPlatformResult {
    /// Successful per-source results, in declaration order.
    pub fn successes(&self) -> impl Iterator<Item = &DiagnosticResult> {
        self.sources.iter().filter_map(SourceOutcome::result)
    }

    pub fn success_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.sources.len() - self.success_count()
    }
}
