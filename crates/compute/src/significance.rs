//! Significance and variance primitives.
//!
//! Pure numeric helpers shared by the walker and the economics model:
//! percent change, the spend-scaled minimum-detectable-effect test,
//! historical z-scores, and account vs. vertical variance resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use funnelscope_core::{VarianceSource, VerticalBenchmarks};

/// Lower bound of the minimum detectable effect, in percent.
pub const MIN_DETECTABLE_EFFECT_FLOOR: f64 = 5.0;
/// Upper bound of the minimum detectable effect, in percent.
pub const MIN_DETECTABLE_EFFECT_CEILING: f64 = 50.0;
/// Minimum history points for a z-score.
pub const MIN_ZSCORE_POINTS: usize = 3;
/// Minimum weekly history points for an account-specific variance.
pub const MIN_ACCOUNT_VARIANCE_POINTS: usize = 4;

/// Percent change from `previous` to `current`.
///
/// Returns 0 when both are zero, and ±100 (sign of `current`) when only
/// `previous` is zero.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            return 100.0;
        }
        if current < 0.0 {
            return -100.0;
        }
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Spend-scaled minimum detectable effect: `100 / sqrt(spend)`, clamped to [5, 50].
pub fn minimum_detectable_effect(spend: f64) -> f64 {
    if spend <= 0.0 {
        return MIN_DETECTABLE_EFFECT_CEILING;
    }
    (100.0 / spend.sqrt()).clamp(MIN_DETECTABLE_EFFECT_FLOOR, MIN_DETECTABLE_EFFECT_CEILING)
}

/// Whether a percent change is meaningful at this spend level.
///
/// With a benchmark variance the change must exceed twice the variance;
/// otherwise it must exceed the spend-scaled minimum detectable effect.
/// Zero or negative spend is never significant.
pub fn is_significant_change(
    delta_percent: f64,
    spend: f64,
    benchmark_variance: Option<f64>,
) -> bool {
    if spend <= 0.0 {
        return false;
    }
    match benchmark_variance {
        Some(variance) => delta_percent.abs() > 2.0 * variance,
        None => delta_percent.abs() > minimum_detectable_effect(spend),
    }
}

/// Population mean and standard deviation.
pub fn population_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Standard score of `value` against `history`.
///
/// `None` with fewer than three points, or when the history has zero
/// variance and `value` differs from its mean.
pub fn z_score(value: f64, history: &[f64]) -> Option<f64> {
    if history.len() < MIN_ZSCORE_POINTS {
        return None;
    }
    let (mean, stddev) = population_stats(history);
    if stddev <= f64::EPSILON {
        return if (value - mean).abs() <= f64::EPSILON {
            Some(0.0)
        } else {
            None
        };
    }
    Some((value - mean) / stddev)
}

/// Coefficient of variation (stddev / mean) in percent; `None` for a zero mean.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let (mean, stddev) = population_stats(values);
    if values.is_empty() || mean.abs() <= f64::EPSILON {
        return None;
    }
    Some(stddev / mean.abs() * 100.0)
}

/// Variance used for a significance test, with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVariance {
    pub percent: f64,
    pub source: VarianceSource,
}

/// Variance for one stage metric, most specific first: the account's own
/// history, the vertical's stage benchmark, the vertical default.
///
/// `None` without usable history or benchmarks; the caller then tests
/// against the minimum detectable effect.
pub fn resolve_variance(
    history: &[f64],
    metric: &str,
    benchmarks: Option<&VerticalBenchmarks>,
) -> Option<ResolvedVariance> {
    if let Some(percent) = account_variance(history) {
        return Some(ResolvedVariance {
            percent,
            source: VarianceSource::Account,
        });
    }
    let benchmarks = benchmarks?;
    let resolved = match benchmarks.stage_variance(metric) {
        Some(percent) => ResolvedVariance {
            percent,
            source: VarianceSource::StageBenchmark,
        },
        None => ResolvedVariance {
            percent: benchmarks.default_variance_percent,
            source: VarianceSource::VerticalDefault,
        },
    };
    Some(resolved)
}

/// Account coefficient of variation, only with at least four points.
pub fn account_variance(history: &[f64]) -> Option<f64> {
    if history.len() < MIN_ACCOUNT_VARIANCE_POINTS {
        return None;
    }
    let cv = coefficient_of_variation(history)?;
    debug!(points = history.len(), cv, "resolved account variance");
    Some(cv)
}
