//! Direction-aware, spend-scaled severity classification.

use funnelscope_core::Severity;

/// Which direction of change hurts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    /// Volume metrics: a decrease is bad.
    Volume,
    /// Cost metrics: an increase is bad.
    Cost,
}

/// Threshold multiplier: tighter bands for larger budgets.
pub fn spend_multiplier(spend: f64) -> f64 {
    if spend > 5_000.0 {
        0.7
    } else if spend > 1_000.0 {
        0.85
    } else {
        1.0
    }
}

/// Classify a percent change.
///
/// Changes in the good direction are healthy. Bad-direction changes are
/// critical above 30×m %, warning above 15×m %, info above 5×m %.
pub fn classify_severity(delta_percent: f64, spend: f64, direction: MetricDirection) -> Severity {
    let bad = match direction {
        MetricDirection::Volume => delta_percent < 0.0,
        MetricDirection::Cost => delta_percent > 0.0,
    };
    if !bad {
        return Severity::Healthy;
    }

    let m = spend_multiplier(spend);
    let magnitude = delta_percent.abs();
    if magnitude > 30.0 * m {
        Severity::Critical
    } else if magnitude > 15.0 * m {
        Severity::Warning
    } else if magnitude > 5.0 * m {
        Severity::Info
    } else {
        Severity::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_direction_is_healthy() {
        assert_eq!(classify_severity(80.0, 100.0, MetricDirection::Volume), Severity::Healthy);
        assert_eq!(classify_severity(-80.0, 100.0, MetricDirection::Cost), Severity::Healthy);
        assert_eq!(classify_severity(0.0, 100.0, MetricDirection::Cost), Severity::Healthy);
    }

    #[test]
    fn low_spend_bands() {
        let v = MetricDirection::Volume;
        assert_eq!(classify_severity(-31.0, 500.0, v), Severity::Critical);
        assert_eq!(classify_severity(-30.0, 500.0, v), Severity::Warning);
        assert_eq!(classify_severity(-16.0, 500.0, v), Severity::Warning);
        assert_eq!(classify_severity(-6.0, 500.0, v), Severity::Info);
        assert_eq!(classify_severity(-5.0, 500.0, v), Severity::Healthy);
    }

    #[test]
    fn high_spend_tightens_bands() {
        let c = MetricDirection::Cost;
        // m = 0.7: critical > 21, warning > 10.5, info > 3.5
        assert_eq!(classify_severity(22.0, 10_000.0, c), Severity::Critical);
        assert_eq!(classify_severity(11.0, 10_000.0, c), Severity::Warning);
        assert_eq!(classify_severity(4.0, 10_000.0, c), Severity::Info);
        assert_eq!(classify_severity(3.0, 10_000.0, c), Severity::Healthy);
    }

    #[test]
    fn multiplier_boundaries() {
        assert_eq!(spend_multiplier(1_000.0), 1.0);
        assert_eq!(spend_multiplier(1_000.01), 0.85);
        assert_eq!(spend_multiplier(5_000.0), 0.85);
        assert_eq!(spend_multiplier(5_000.01), 0.7);
    }
}
