//! Conversion-lag maturity model.
//!
//! Platforms keep attributing conversions for several days after the fact,
//! so a recent day reports only a fraction of its eventual total. The model
//! assigns each day a maturity fraction by age, averages it over a period,
//! and flags comparisons whose periods differ too much in maturity.

use chrono::NaiveDate;
use tracing::debug;

use funnelscope_core::{MaturityAssessment, TimeRange};

/// Maturity by age in days: day-of, 1, 2, 3 days ago. Older days are fully mature.
const DEFAULT_CURVE: [f64; 4] = [0.35, 0.65, 0.85, 0.95];

/// Gap in percentage points above which two periods are unsafe to compare.
pub const DEFAULT_GAP_THRESHOLD_POINTS: f64 = 10.0;

/// Age → reported-fraction curve.
#[derive(Debug, Clone, PartialEq)]
pub struct MaturityModel {
    curve: Vec<f64>,
    gap_threshold_points: f64,
}

impl Default for MaturityModel {
    fn default() -> Self {
        Self {
            curve: DEFAULT_CURVE.to_vec(),
            gap_threshold_points: DEFAULT_GAP_THRESHOLD_POINTS,
        }
    }
}

impl MaturityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_threshold(mut self, points: f64) -> Self {
        self.gap_threshold_points = points;
        self
    }

    /// Maturity of a single reporting day as of `as_of`.
    ///
    /// Days in the future of `as_of` are treated as day-of.
    pub fn day_maturity(&self, day: NaiveDate, as_of: NaiveDate) -> f64 {
        let age = (as_of - day).num_days().max(0) as usize;
        self.curve.get(age).copied().unwrap_or(1.0)
    }

    /// Mean maturity across the days of `period`.
    pub fn period_maturity(&self, period: &TimeRange, as_of: NaiveDate) -> f64 {
        let days = period.days();
        if days <= 0 {
            return 1.0;
        }
        let total: f64 = period.dates().map(|d| self.day_maturity(d, as_of)).sum();
        total / days as f64
    }

    /// Compare two periods' maturity and flag unsafe comparisons.
    pub fn assess(
        &self,
        current: &TimeRange,
        previous: &TimeRange,
        as_of: NaiveDate,
    ) -> MaturityAssessment {
        let current_maturity = self.period_maturity(current, as_of);
        let previous_maturity = self.period_maturity(previous, as_of);
        let gap_points = (current_maturity - previous_maturity).abs() * 100.0;
        let comparison_unsafe = gap_points > self.gap_threshold_points;

        debug!(
            current = current_maturity,
            previous = previous_maturity,
            gap_points,
            comparison_unsafe,
            "assessed data maturity"
        );

        MaturityAssessment {
            current: current_maturity,
            previous: previous_maturity,
            gap_points,
            comparison_unsafe,
        }
    }
}

/// Estimate the eventual count from an observed count and its maturity.
pub fn inflate_count(observed: f64, maturity: f64) -> f64 {
    if maturity <= 0.0 {
        return observed;
    }
    observed / maturity.min(1.0)
}

/// Conversions expected to arrive later: mature estimate minus observed.
pub fn estimate_undercount(observed: f64, maturity: f64) -> f64 {
    (inflate_count(observed, maturity) - observed).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_maturity_curve() {
        let model = MaturityModel::new();
        let today = date(2025, 3, 14);
        assert_eq!(model.day_maturity(today, today), 0.35);
        assert_eq!(model.day_maturity(today - Duration::days(1), today), 0.65);
        assert_eq!(model.day_maturity(today - Duration::days(2), today), 0.85);
        assert_eq!(model.day_maturity(today - Duration::days(3), today), 0.95);
        assert_eq!(model.day_maturity(today - Duration::days(4), today), 1.0);
        assert_eq!(model.day_maturity(today - Duration::days(40), today), 1.0);
        assert_eq!(model.day_maturity(today + Duration::days(2), today), 0.35);
    }

    #[test]
    fn period_maturity_is_mean_of_days() {
        let model = MaturityModel::new();
        let today = date(2025, 3, 14);
        let period = TimeRange::new(date(2025, 3, 8), today).unwrap();
        // 3 mature days + 0.95 + 0.85 + 0.65 + 0.35
        let expected = (3.0 + 0.95 + 0.85 + 0.65 + 0.35) / 7.0;
        assert!((model.period_maturity(&period, today) - expected).abs() < 1e-10);
    }

    #[test]
    fn recent_week_vs_mature_week_is_unsafe() {
        let model = MaturityModel::new();
        let today = date(2025, 3, 14);
        let current = TimeRange::new(date(2025, 3, 8), today).unwrap();
        let previous = current.preceding().unwrap();
        let assessment = model.assess(&current, &previous, today);
        assert_eq!(assessment.previous, 1.0);
        assert!(assessment.gap_points > 10.0);
        assert!(assessment.comparison_unsafe);
    }

    #[test]
    fn old_periods_are_safe() {
        let model = MaturityModel::new();
        let current = TimeRange::new(date(2025, 3, 1), date(2025, 3, 7)).unwrap();
        let previous = current.preceding().unwrap();
        let assessment = model.assess(&current, &previous, date(2025, 3, 20));
        assert_eq!(assessment.gap_points, 0.0);
        assert!(!assessment.comparison_unsafe);
    }

    #[test]
    fn custom_gap_threshold() {
        let model = MaturityModel::new().with_gap_threshold(50.0);
        let today = date(2025, 3, 14);
        let current = TimeRange::new(date(2025, 3, 8), today).unwrap();
        let assessment = model.assess(&current, &current.preceding().unwrap(), today);
        assert!(!assessment.comparison_unsafe);
    }

    #[test]
    fn inflation_and_undercount() {
        assert!((inflate_count(65.0, 0.65) - 100.0).abs() < 1e-10);
        assert!((estimate_undercount(65.0, 0.65) - 35.0).abs() < 1e-10);
        assert_eq!(inflate_count(40.0, 1.0), 40.0);
        assert_eq!(estimate_undercount(40.0, 1.0), 0.0);
        assert_eq!(inflate_count(40.0, 0.0), 40.0);
    }
}
