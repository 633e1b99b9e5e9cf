//! Generic finding rules applied to every funnel walk.

use funnelscope_core::{
    Finding, FunnelDropoff, FunnelSchema, MaturityAssessment, PrimaryKpiSummary, Severity,
    StageDiagnostic,
};

/// Drop-offs worse than this (percent) produce a warning.
pub const DROPOFF_WARNING_PERCENT: f64 = -20.0;
/// Drop-offs worse than this (percent) are critical.
pub const DROPOFF_CRITICAL_PERCENT: f64 = -40.0;
/// Awareness volume swings beyond ± this (percent) are reported.
pub const AWARENESS_SHIFT_PERCENT: f64 = 20.0;

/// Findings produced without any advisor: primary KPI, bottleneck,
/// steep drop-offs, and awareness volume shifts, in that order.
pub fn generic_findings(
    funnel: &FunnelSchema,
    primary_kpi: &PrimaryKpiSummary,
    bottleneck: Option<&StageDiagnostic>,
    stages: &[StageDiagnostic],
    dropoffs: &[FunnelDropoff],
) -> Vec<Finding> {
    let mut findings = vec![primary_kpi_finding(funnel, primary_kpi, bottleneck)];

    if let Some(stage) = bottleneck {
        findings.push(bottleneck_finding(stage));
    }

    findings.extend(dropoffs.iter().filter_map(dropoff_finding));

    if let Some(awareness) = stages.first() {
        if awareness.delta_percent.abs() > AWARENESS_SHIFT_PERCENT {
            findings.push(awareness_finding(awareness));
        }
    }

    findings
}

fn stage_label(funnel: &FunnelSchema, metric: &str) -> String {
    funnel
        .stage(metric)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| metric.to_string())
}

fn primary_kpi_finding(
    funnel: &FunnelSchema,
    kpi: &PrimaryKpiSummary,
    bottleneck: Option<&StageDiagnostic>,
) -> Finding {
    let label = stage_label(funnel, &kpi.metric);

    if kpi.cost_missing {
        return Finding::new(
            Severity::Info,
            kpi.metric.as_str(),
            format!("Cost per {label} was not reported for both periods; no cost comparison"),
        )
        .with_recommendation(format!("Check that the platform reports cost per {label}"));
    }

    if kpi.severity == Severity::Healthy {
        return Finding::new(
            Severity::Healthy,
            kpi.metric.as_str(),
            format!(
                "Cost per {} is {:.2} vs {:.2} last period ({:+.1}%), within the healthy range",
                label, kpi.current_cost, kpi.previous_cost, kpi.delta_percent
            ),
        );
    }

    let recommendation = match bottleneck {
        Some(stage) => format!(
            "Start with the {} stage, which shows the steepest significant decline",
            stage.stage
        ),
        None => {
            "No single stage explains the change; check auction costs (CPM) and creative fatigue"
                .to_string()
        }
    };

    Finding::new(
        kpi.severity,
        kpi.metric.as_str(),
        format!(
            "Cost per {} rose to {:.2} from {:.2} ({:+.1}%)",
            label, kpi.current_cost, kpi.previous_cost, kpi.delta_percent
        ),
    )
    .with_recommendation(recommendation)
}

fn bottleneck_finding(stage: &StageDiagnostic) -> Finding {
    Finding::new(
        stage.severity.min(Severity::Info),
        stage.metric.as_str(),
        format!(
            "{} is the funnel bottleneck: {:.0} vs {:.0} last period ({:+.1}%)",
            stage.stage, stage.current_value, stage.previous_value, stage.delta_percent
        ),
    )
    .with_recommendation(format!(
        "Investigate what changed at the {} stage before scaling spend",
        stage.stage
    ))
}

fn dropoff_finding(dropoff: &FunnelDropoff) -> Option<Finding> {
    if dropoff.delta_percent >= DROPOFF_WARNING_PERCENT {
        return None;
    }
    let severity = if dropoff.delta_percent < DROPOFF_CRITICAL_PERCENT {
        Severity::Critical
    } else {
        Severity::Warning
    };
    Some(
        Finding::new(
            severity,
            format!("{} -> {}", dropoff.from_stage, dropoff.to_stage),
            format!(
                "Conversion from {} to {} fell {:.1}% ({:.2}% vs {:.2}%)",
                dropoff.from_stage,
                dropoff.to_stage,
                dropoff.delta_percent.abs(),
                dropoff.current_rate * 100.0,
                dropoff.previous_rate * 100.0
            ),
        )
        .with_recommendation(format!(
            "Review the experience between {} and {} (landing page, offer, checkout friction)",
            dropoff.from_stage, dropoff.to_stage
        )),
    )
}

fn awareness_finding(stage: &StageDiagnostic) -> Finding {
    let (verb, recommendation) = if stage.delta_percent > 0.0 {
        ("rose", "Confirm downstream stages are keeping pace with the added volume")
    } else {
        ("fell", "Check budget pacing, bid caps, and audience size")
    };
    Finding::new(
        Severity::Info,
        stage.metric.as_str(),
        format!(
            "{} volume {} {:.1}% ({:.0} vs {:.0})",
            stage.stage,
            verb,
            stage.delta_percent.abs(),
            stage.current_value,
            stage.previous_value
        ),
    )
    .with_recommendation(recommendation)
}

/// Warning attached when the compared periods differ too much in maturity.
pub fn maturity_finding(assessment: &MaturityAssessment) -> Option<Finding> {
    if !assessment.comparison_unsafe {
        return None;
    }
    Some(
        Finding::new(
            Severity::Warning,
            "data_maturity",
            format!(
                "Current period is {:.0}% mature vs {:.0}% for the previous period ({:.1} point gap); recent conversions are still being attributed",
                assessment.current * 100.0,
                assessment.previous * 100.0,
                assessment.gap_points
            ),
        )
        .with_recommendation(
            "Discount conversion declines in the current period or re-run once it matures",
        ),
    )
}
