//! Multi-source orchestration.
//!
//! One funnel walk per configured source, run concurrently. A source that
//! fails to fetch is recorded as an error outcome; the others still complete.
//! Configuration problems (unknown platform client, no funnel for the
//! source/vertical pair, bad period length) reject the whole run before any
//! fetch is issued.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use funnelscope_compute::{
    analyze_funnel, maturity_finding, AdvisorRef, AdvisorRegistry, FunnelWalk, MaturityModel,
};
use funnelscope_core::{
    comparison_periods, sort_findings, ComparisonPeriods, DiagnoseError, DiagnosticResult,
    EntityLevel, FunnelSchema, VerticalBenchmarks,
};
use funnelscope_rules::Registry;

use crate::client::PlatformClient;
use crate::concurrency::gather_all_settled;
use crate::context::{ContextBuilder, ContextOptions};
use crate::correlation::{correlate, Correlation};
use crate::portfolio::rank_actions;
use crate::summary::summarize;
use crate::types::{MultiPlatformResult, SourceOutcome};

/// One source to diagnose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source: String,
    pub vertical: String,
    pub entity_id: String,
    #[serde(default = "default_entity_level")]
    pub entity_level: EntityLevel,
    #[serde(default)]
    pub context: ContextOptions,
}

fn default_entity_level() -> EntityLevel {
    EntityLevel::Account
}

impl SourceConfig {
    pub fn new(
        source: impl Into<String>,
        vertical: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            vertical: vertical.into(),
            entity_id: entity_id.into(),
            entity_level: default_entity_level(),
            context: ContextOptions::default(),
        }
    }

    pub fn with_entity_level(mut self, level: EntityLevel) -> Self {
        self.entity_level = level;
        self
    }

    pub fn with_context(mut self, context: ContextOptions) -> Self {
        self.context = context;
        self
    }
}

/// Parses `source:vertical:entity_id[:entity_level]`.
impl FromStr for SourceConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() < 3 || parts.len() > 4 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(format!(
                "invalid source '{}': expected source:vertical:entity_id[:entity_level]",
                s
            ));
        }
        let mut config = SourceConfig::new(parts[0], parts[1], parts[2]);
        if let Some(level) = parts.get(3) {
            config.entity_level = level.parse()?;
        }
        Ok(config)
    }
}

/// Inputs for one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    /// Last day of the current comparison window.
    pub reference_date: NaiveDate,
    pub period_days: i64,
    /// Date the data was pulled; enables the maturity assessment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub sources: Vec<SourceConfig>,
}

impl OrchestrationRequest {
    pub fn new(reference_date: NaiveDate, period_days: i64) -> Self {
        Self {
            reference_date,
            period_days,
            as_of: None,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// Everything one source needs, resolved before any fetch.
struct SourcePlan<'p> {
    config: &'p SourceConfig,
    client: &'p dyn PlatformClient,
    funnel: &'p FunnelSchema,
    benchmarks: Option<&'p VerticalBenchmarks>,
    advisors: &'p [AdvisorRef],
}

/// Runs funnel walks across sources and correlates the results.
pub struct Orchestrator<'a> {
    registry: &'a Registry,
    advisors: &'a AdvisorRegistry,
    clients: HashMap<String, Arc<dyn PlatformClient>>,
    maturity: MaturityModel,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a Registry, advisors: &'a AdvisorRegistry) -> Self {
        Self {
            registry,
            advisors,
            clients: HashMap::new(),
            maturity: MaturityModel::default(),
        }
    }

    /// Register a client under its [`PlatformClient::source_name`]. A later
    /// client for the same source replaces the earlier one.
    pub fn with_client(mut self, client: Arc<dyn PlatformClient>) -> Self {
        let source = client.source_name().to_string();
        if self.clients.insert(source.clone(), client).is_some() {
            warn!(%source, "platform client registered twice, keeping the last one");
        }
        self
    }

    pub fn with_maturity_model(mut self, model: MaturityModel) -> Self {
        self.maturity = model;
        self
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Run every configured source and reduce the results.
    pub async fn run(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<MultiPlatformResult, DiagnoseError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let periods = comparison_periods(request.reference_date, request.period_days)?;

        let plans = request
            .sources
            .iter()
            .map(|config| self.plan(config))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            %run_id,
            sources = plans.len(),
            current = %periods.current,
            previous = %periods.previous,
            "starting orchestration"
        );

        let runs = plans
            .iter()
            .map(|plan| self.run_source(plan, &periods, request));
        let results = gather_all_settled(runs).await;

        let sources: Vec<SourceOutcome> = plans
            .iter()
            .zip(results)
            .map(|(plan, result)| match result {
                Ok(result) => SourceOutcome::Success {
                    source: plan.config.source.clone(),
                    entity_id: plan.config.entity_id.clone(),
                    result: Box::new(result),
                },
                Err(e) => {
                    warn!(
                        source = %plan.config.source,
                        entity_id = %plan.config.entity_id,
                        error = %e,
                        "source diagnosis failed"
                    );
                    SourceOutcome::Error {
                        source: plan.config.source.clone(),
                        entity_id: plan.config.entity_id.clone(),
                        error: e.to_string(),
                    }
                }
            })
            .collect();

        let successes: Vec<&DiagnosticResult> =
            sources.iter().filter_map(SourceOutcome::result).collect();
        let correlation = if successes.len() >= 2 {
            correlate(&successes)
        } else {
            debug!(successes = successes.len(), "too few results to correlate");
            Correlation::default()
        };

        let portfolio_actions = rank_actions(&sources, &correlation);
        let executive_summary = summarize(&sources, &correlation, &portfolio_actions);

        let result = MultiPlatformResult {
            run_id,
            generated_at: Utc::now(),
            periods,
            sources,
            cross_platform_findings: correlation.findings,
            budget_recommendations: correlation.budget_recommendations,
            portfolio_actions,
            executive_summary,
        };

        info!(
            %run_id,
            succeeded = result.success_count(),
            failed = result.error_count(),
            cross_platform = result.cross_platform_findings.len(),
            actions = result.portfolio_actions.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "orchestration complete"
        );
        Ok(result)
    }

    fn plan<'p>(&'p self, config: &'p SourceConfig) -> Result<SourcePlan<'p>, DiagnoseError> {
        let client = self
            .clients
            .get(&config.source)
            .ok_or_else(|| DiagnoseError::UnknownSource(config.source.clone()))?;
        let funnel = self.registry.funnel(&config.source, &config.vertical)?;
        Ok(SourcePlan {
            config,
            client: client.as_ref(),
            funnel,
            benchmarks: self.registry.benchmarks(&config.source, &config.vertical),
            advisors: self.advisors.advisors(&config.source, &config.vertical),
        })
    }

    async fn run_source(
        &self,
        plan: &SourcePlan<'_>,
        periods: &ComparisonPeriods,
        request: &OrchestrationRequest,
    ) -> Result<DiagnosticResult, DiagnoseError> {
        let config = plan.config;
        let snapshots = plan
            .client
            .fetch_comparison_snapshots(
                &config.entity_id,
                config.entity_level,
                &periods.current,
                &periods.previous,
                plan.funnel,
            )
            .await?;

        let context = ContextBuilder::new(
            plan.client,
            &config.entity_id,
            config.entity_level,
            plan.funnel,
            // History ends the day before the current window starts.
            periods.previous.until,
            request.period_days,
        )
        .with_options(config.context.clone())
        .with_structural_window(periods.current)
        .with_snapshots(&snapshots.current, &snapshots.previous)
        .build()
        .await?;

        let mut walk = FunnelWalk::new(plan.funnel, &snapshots.current, &snapshots.previous)
            .with_periods(periods.current, periods.previous)
            .with_advisors(plan.advisors)
            .with_context(&context);
        if let Some(benchmarks) = plan.benchmarks {
            walk = walk.with_benchmarks(benchmarks);
        }

        let mut result = analyze_funnel(&walk);
        result.source = Some(config.source.clone());

        if let Some(as_of) = request.as_of {
            let assessment = self.maturity.assess(&periods.current, &periods.previous, as_of);
            if let Some(finding) = maturity_finding(&assessment) {
                result.findings.push(finding);
                sort_findings(&mut result.findings);
            }
            result.maturity = Some(assessment);
        }

        debug!(
            source = %config.source,
            findings = result.findings.len(),
            bottleneck = result.bottleneck.as_ref().map(|b| b.metric.as_str()),
            "source diagnosed"
        );
        Ok(result)
    }
}
