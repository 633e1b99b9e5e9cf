//! Funnel walker: period-over-period comparison of one funnel.
//!
//! Given a funnel schema and two snapshots, produces per-stage diagnostics,
//! per-transition drop-offs, a single bottleneck, the primary-KPI summary,
//! and a severity-sorted finding list from generic rules plus advisors.
//!
//! Sub-modules:
//! - [`findings`]: generic finding rules

pub mod findings;

use tracing::{debug, info};

use funnelscope_core::{
    sort_findings, DiagnosticContext, DiagnosticResult, EfficiencyMetrics, FunnelDropoff,
    FunnelSchema, MetricComparison, MetricSnapshot, PrimaryKpiSummary, Severity, StageDiagnostic,
    TimeRange, VerticalBenchmarks,
};

use crate::advisor::AdvisorRef;
use crate::economics::{dropoff_impact, rank_elasticity, stage_impact};
use crate::severity::{classify_severity, MetricDirection};
use crate::significance::{is_significant_change, percent_change, resolve_variance, z_score};

pub use findings::maturity_finding;

/// Inputs for one walk. Borrowed; the walker never mutates them.
#[derive(Clone, Copy)]
pub struct FunnelWalk<'a> {
    pub funnel: &'a FunnelSchema,
    pub current: &'a MetricSnapshot,
    pub previous: &'a MetricSnapshot,
    pub current_period: TimeRange,
    pub previous_period: TimeRange,
    pub benchmarks: Option<&'a VerticalBenchmarks>,
    pub advisors: &'a [AdvisorRef],
    pub context: Option<&'a DiagnosticContext>,
}

impl<'a> FunnelWalk<'a> {
    /// Walk two snapshots, taking the periods from the snapshots themselves.
    pub fn new(
        funnel: &'a FunnelSchema,
        current: &'a MetricSnapshot,
        previous: &'a MetricSnapshot,
    ) -> Self {
        Self {
            funnel,
            current,
            previous,
            current_period: current.period,
            previous_period: previous.period,
            benchmarks: None,
            advisors: &[],
            context: None,
        }
    }

    pub fn with_periods(mut self, current: TimeRange, previous: TimeRange) -> Self {
        self.current_period = current;
        self.previous_period = previous;
        self
    }

    pub fn with_benchmarks(mut self, benchmarks: &'a VerticalBenchmarks) -> Self {
        self.benchmarks = Some(benchmarks);
        self
    }

    pub fn with_advisors(mut self, advisors: &'a [AdvisorRef]) -> Self {
        self.advisors = advisors;
        self
    }

    pub fn with_context(mut self, context: &'a DiagnosticContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Run the funnel walk.
pub fn analyze_funnel(walk: &FunnelWalk<'_>) -> DiagnosticResult {
    let spend = walk.current.spend();

    let stages = analyze_stages(walk, spend);
    let dropoffs = analyze_dropoffs(walk);
    let bottleneck = find_bottleneck(&stages).cloned();
    let primary_kpi = summarize_primary_kpi(walk, spend);

    let mut findings = findings::generic_findings(
        walk.funnel,
        &primary_kpi,
        bottleneck.as_ref(),
        &stages,
        &dropoffs,
    );
    let generic_count = findings.len();
    for advisor in walk.advisors {
        let advice = advisor.advise(&stages, &dropoffs, walk.current, walk.previous, walk.context);
        findings.extend(advice);
    }
    sort_findings(&mut findings);

    let elasticity = walk
        .context
        .and_then(|c| c.average_order_value())
        .map(|_| rank_elasticity(&stages));

    info!(
        stages = stages.len(),
        bottleneck = bottleneck.as_ref().map(|b| b.metric.as_str()).unwrap_or("none"),
        generic_findings = generic_count,
        advisor_findings = findings.len() - generic_count,
        "funnel walk complete"
    );

    DiagnosticResult {
        current_period: walk.current_period,
        previous_period: walk.previous_period,
        spend: compare(spend, walk.previous.spend()),
        primary_kpi,
        stages,
        dropoffs,
        bottleneck,
        findings,
        efficiency: efficiency(walk),
        elasticity,
        maturity: None,
        source: None,
    }
}

fn compare(current: f64, previous: f64) -> MetricComparison {
    MetricComparison {
        current,
        previous,
        delta_percent: percent_change(current, previous),
    }
}

/// Per-stage counts, significance, severity, history z-score, and impact.
fn analyze_stages(walk: &FunnelWalk<'_>, spend: f64) -> Vec<StageDiagnostic> {
    let revenue = walk.context.and_then(|c| c.revenue);

    walk.funnel
        .stages
        .iter()
        .map(|stage| {
            let current_value = walk.current.count(&stage.metric);
            let previous_value = walk.previous.count(&stage.metric);
            let delta = current_value - previous_value;
            let delta_percent = percent_change(current_value, previous_value);

            let history = walk
                .context
                .map(|c| c.history_for(&stage.metric))
                .unwrap_or_default();
            let variance = resolve_variance(&history, &stage.metric, walk.benchmarks);

            let is_significant =
                is_significant_change(delta_percent, spend, variance.map(|v| v.percent));
            let severity = classify_severity(delta_percent, spend, MetricDirection::Volume);
            let economic_impact = revenue
                .as_ref()
                .and_then(|r| stage_impact(delta, walk.funnel.position_of(stage), r));

            debug!(
                metric = %stage.metric,
                current_value,
                previous_value,
                delta_percent,
                variance = ?variance.map(|v| v.percent),
                is_significant,
                severity = %severity,
                "stage analyzed"
            );

            StageDiagnostic {
                stage: stage.name.clone(),
                metric: stage.metric.clone(),
                current_value,
                previous_value,
                delta,
                delta_percent,
                is_significant,
                variance_source: variance.map(|v| v.source),
                severity,
                z_score: z_score(current_value, &history),
                economic_impact,
            }
        })
        .collect()
}

/// Conversion rate of every adjacent stage pair.
fn analyze_dropoffs(walk: &FunnelWalk<'_>) -> Vec<FunnelDropoff> {
    let revenue = walk.context.and_then(|c| c.revenue);

    walk.funnel
        .stages
        .windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let (c, p) = (walk.current, walk.previous);
            let current_rate = rate(c.count(&to.metric), c.count(&from.metric));
            let previous_rate = rate(p.count(&to.metric), p.count(&from.metric));

            let mut dropoff = FunnelDropoff {
                from_stage: from.name.clone(),
                to_stage: to.name.clone(),
                current_rate,
                previous_rate,
                delta_percent: percent_change(current_rate, previous_rate),
                economic_impact: None,
            };
            if let Some(r) = revenue.as_ref() {
                let expected_conversions = walk.previous.count(&from.metric);
                dropoff.economic_impact = dropoff_impact(&dropoff, expected_conversions, r);
            }
            dropoff
        })
        .collect()
}

fn rate(to: f64, from: f64) -> f64 {
    if from > 0.0 {
        to / from
    } else {
        0.0
    }
}

/// Most negative significant decline; the first stage wins exact ties.
pub fn find_bottleneck(stages: &[StageDiagnostic]) -> Option<&StageDiagnostic> {
    let mut worst: Option<&StageDiagnostic> = None;
    for stage in stages.iter().filter(|s| s.is_significant && s.delta_percent < 0.0) {
        if worst.map_or(true, |w| stage.delta_percent < w.delta_percent) {
            worst = Some(stage);
        }
    }
    worst
}

/// Cost of the primary KPI in both periods.
///
/// An unreported cost is not a zero cost: without both, the delta stays 0.
fn summarize_primary_kpi(walk: &FunnelWalk<'_>, spend: f64) -> PrimaryKpiSummary {
    let metric = &walk.funnel.primary_kpi;
    let current = walk.current.cost(metric);
    let previous = walk.previous.cost(metric);

    let (delta_percent, severity) = match (current, previous) {
        (Some(c), Some(p)) => {
            let delta = percent_change(c, p);
            (delta, classify_severity(delta, spend, MetricDirection::Cost))
        }
        _ => {
            debug!(
                metric = %metric,
                current = ?current,
                previous = ?previous,
                "primary KPI cost missing, skipping comparison"
            );
            (0.0, Severity::Info)
        }
    };

    PrimaryKpiSummary {
        metric: metric.clone(),
        current_cost: current.unwrap_or(0.0),
        previous_cost: previous.unwrap_or(0.0),
        delta_percent,
        severity,
        cost_missing: current.is_none() || previous.is_none(),
    }
}

fn efficiency(walk: &FunnelWalk<'_>) -> EfficiencyMetrics {
    let (c, p) = (walk.current, walk.previous);
    EfficiencyMetrics {
        cpm: compare(c.cpm(), p.cpm()),
        ctr: compare(c.ctr(), p.ctr()),
        roas: compare(c.roas(walk.funnel), p.roas(walk.funnel)),
    }
}
