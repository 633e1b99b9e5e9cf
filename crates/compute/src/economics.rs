//! Economic impact and elasticity ranking.
//!
//! Converts stage and drop-off deltas into estimated revenue. Upper-funnel
//! volume does not convert 1:1, so stage deltas are attenuated by funnel
//! position before multiplying by average order value.

use tracing::debug;

use funnelscope_core::{
    EconomicImpact, ElasticityRanking, FunnelDropoff, FunnelPosition, RevenueData, StageDiagnostic,
};

/// Click-level stages: one click is worth a tenth of a conversion.
pub const CLICK_ATTENUATION: f64 = 0.1;
/// Impression-level stages: one impression is worth a hundredth of a conversion.
pub const IMPRESSION_ATTENUATION: f64 = 0.01;

/// Conversion-equivalent multiplier for a funnel position.
pub fn attenuation(position: FunnelPosition) -> f64 {
    match position {
        FunnelPosition::Conversion => 1.0,
        FunnelPosition::Click => CLICK_ATTENUATION,
        FunnelPosition::Impression => IMPRESSION_ATTENUATION,
    }
}

/// Revenue delta relative to the previous period's revenue, in percent.
/// Zero when the baseline is unknown.
fn impact_percent(revenue_delta: f64, previous_revenue: f64) -> f64 {
    if previous_revenue <= 0.0 {
        return 0.0;
    }
    revenue_delta / previous_revenue * 100.0
}

/// Economic impact of a stage volume change.
///
/// `None` when the revenue data has no average order value.
pub fn stage_impact(
    count_delta: f64,
    position: FunnelPosition,
    revenue: &RevenueData,
) -> Option<EconomicImpact> {
    let aov = revenue.average_order_value?;
    let conversion_delta = count_delta * attenuation(position);
    let revenue_delta = conversion_delta * aov;
    Some(EconomicImpact {
        conversion_delta,
        revenue_delta,
        revenue_impact_percent: impact_percent(revenue_delta, revenue.previous_total_revenue),
    })
}

/// Economic impact of a conversion-rate change on one transition.
///
/// `expected_conversions` is the transition's own upstream base: the
/// previous period's from-stage count.
pub fn dropoff_impact(
    dropoff: &FunnelDropoff,
    expected_conversions: f64,
    revenue: &RevenueData,
) -> Option<EconomicImpact> {
    let aov = revenue.average_order_value?;
    let conversion_delta = (dropoff.current_rate - dropoff.previous_rate) * expected_conversions;
    let revenue_delta = conversion_delta * aov;
    Some(EconomicImpact {
        conversion_delta,
        revenue_delta,
        revenue_impact_percent: impact_percent(revenue_delta, revenue.previous_total_revenue),
    })
}

/// Rank significant, revenue-losing stages by absolute dollar impact.
pub fn rank_elasticity(stages: &[StageDiagnostic]) -> ElasticityRanking {
    let mut ranked: Vec<StageDiagnostic> = stages
        .iter()
        .filter(|s| s.is_significant)
        .filter(|s| matches!(s.economic_impact, Some(impact) if impact.revenue_delta < 0.0))
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        let a = revenue_delta(a).abs();
        let b = revenue_delta(b).abs();
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_revenue_loss = ranked.iter().map(revenue_delta).sum();
    debug!(ranked = ranked.len(), total_revenue_loss, "elasticity ranking complete");

    ElasticityRanking {
        ranked,
        total_revenue_loss,
    }
}

fn revenue_delta(stage: &StageDiagnostic) -> f64 {
    stage.economic_impact.map(|i| i.revenue_delta).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnelscope_core::Severity;

    fn revenue(aov: Option<f64>, previous: f64) -> RevenueData {
        RevenueData {
            average_order_value: aov,
            total_revenue: 0.0,
            previous_total_revenue: previous,
        }
    }

    fn stage(metric: &str, significant: bool, revenue_delta: Option<f64>) -> StageDiagnostic {
        StageDiagnostic {
            stage: metric.to_string(),
            metric: metric.to_string(),
            current_value: 0.0,
            previous_value: 0.0,
            delta: 0.0,
            delta_percent: 0.0,
            is_significant: significant,
            variance_source: None,
            severity: Severity::Info,
            z_score: None,
            economic_impact: revenue_delta.map(|r| EconomicImpact {
                conversion_delta: 0.0,
                revenue_delta: r,
                revenue_impact_percent: 0.0,
            }),
        }
    }

    #[test]
    fn conversion_stage_not_attenuated() {
        let r = revenue(Some(50.0), 2_000.0);
        let impact = stage_impact(-10.0, FunnelPosition::Conversion, &r).unwrap();
        assert_eq!(impact.conversion_delta, -10.0);
        assert_eq!(impact.revenue_delta, -500.0);
        assert_eq!(impact.revenue_impact_percent, -25.0);
    }

    #[test]
    fn upper_funnel_attenuation() {
        let r = revenue(Some(50.0), 0.0);
        let clicks = stage_impact(-100.0, FunnelPosition::Click, &r).unwrap();
        assert!((clicks.revenue_delta - -500.0).abs() < 1e-9);
        let impressions = stage_impact(-10_000.0, FunnelPosition::Impression, &r).unwrap();
        assert!((impressions.revenue_delta - -5_000.0).abs() < 1e-9);
        // unknown baseline
        assert_eq!(impressions.revenue_impact_percent, 0.0);
    }

    #[test]
    fn no_aov_no_impact() {
        assert!(stage_impact(-10.0, FunnelPosition::Conversion, &revenue(None, 100.0)).is_none());
    }

    #[test]
    fn dropoff_uses_upstream_base() {
        let dropoff = FunnelDropoff {
            from_stage: "add_to_cart".into(),
            to_stage: "purchase".into(),
            current_rate: 0.2,
            previous_rate: 0.3,
            delta_percent: -33.3,
            economic_impact: None,
        };
        let impact = dropoff_impact(&dropoff, 400.0, &revenue(Some(25.0), 5_000.0)).unwrap();
        assert!((impact.conversion_delta - -40.0).abs() < 1e-9);
        assert!((impact.revenue_delta - -1_000.0).abs() < 1e-9);
        assert!((impact.revenue_impact_percent - -20.0).abs() < 1e-9);
    }

    #[test]
    fn elasticity_filters_and_orders() {
        let stages = vec![
            stage("impressions", true, Some(-200.0)),
            stage("clicks", false, Some(-5_000.0)),
            stage("add_to_cart", true, Some(300.0)),
            stage("checkout", true, Some(0.0)),
            stage("landing", true, None),
            stage("purchase", true, Some(-1_500.0)),
        ];
        let ranking = rank_elasticity(&stages);
        let metrics: Vec<_> = ranking.ranked.iter().map(|s| s.metric.as_str()).collect();
        assert_eq!(metrics, vec!["purchase", "impressions"]);
        assert_eq!(ranking.total_revenue_loss, -1_700.0);
    }

    #[test]
    fn empty_ranking_has_zero_loss() {
        let ranking = rank_elasticity(&[stage("purchase", false, Some(-10.0))]);
        assert!(ranking.ranked.is_empty());
        assert_eq!(ranking.total_revenue_loss, 0.0);
    }
}
