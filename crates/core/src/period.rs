//! Calendar periods and comparison-window construction.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DiagnoseError, Result};

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl TimeRange {
    /// Build a validated range. Rejects `since > until`.
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self> {
        if since > until {
            return Err(DiagnoseError::InvalidTimeRange { since, until });
        }
        Ok(Self { since, until })
    }

    /// Re-check a range that may have been deserialized without validation.
    pub fn validate(&self) -> Result<()> {
        Self::new(self.since, self.until).map(|_| ())
    }

    /// Number of days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.until - self.since).num_days() + 1
    }

    /// Iterate every date in the range, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let since = self.since;
        (0..self.days().max(0)).map(move |offset| since + Duration::days(offset))
    }

    /// The range of the same length ending the day before this one starts.
    /// `None` when it would fall before the earliest representable date.
    pub fn preceding(&self) -> Option<Self> {
        let until = self.since.pred_opt()?;
        window_ending(until, self.days())
    }
}

/// `days` ending at `until` inclusive, or `None` on date overflow.
fn window_ending(until: NaiveDate, days: i64) -> Option<TimeRange> {
    let since = Duration::try_days(days - 1).and_then(|d| until.checked_sub_signed(d))?;
    Some(TimeRange { since, until })
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.since, self.until)
    }
}

/// Current and previous comparison windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPeriods {
    pub current: TimeRange,
    pub previous: TimeRange,
}

/// Current window is the `days` ending at `reference` inclusive; previous is
/// the `days` immediately before it, with no gap or overlap.
pub fn comparison_periods(reference: NaiveDate, days: i64) -> Result<ComparisonPeriods> {
    if days < 1 {
        return Err(DiagnoseError::InvalidPeriodLength(days));
    }
    let current = window_ending(reference, days)
        .ok_or(DiagnoseError::InvalidPeriodLength(days))?;
    let previous = current
        .preceding()
        .ok_or(DiagnoseError::InvalidPeriodLength(days))?;
    Ok(ComparisonPeriods { current, previous })
}

/// `count` contiguous windows of `days` ending at `reference`, most recent first.
pub fn trailing_periods(reference: NaiveDate, days: i64, count: usize) -> Result<Vec<TimeRange>> {
    if days < 1 {
        return Err(DiagnoseError::InvalidPeriodLength(days));
    }
    let mut periods: Vec<TimeRange> = Vec::with_capacity(count);
    for _ in 0..count {
        let window = match periods.last() {
            Some(last) => last.preceding(),
            None => window_ending(reference, days),
        };
        periods.push(window.ok_or(DiagnoseError::InvalidPeriodLength(days))?);
    }
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = TimeRange::new(date(2025, 3, 10), date(2025, 3, 1)).unwrap_err();
        assert!(matches!(err, DiagnoseError::InvalidTimeRange { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = TimeRange::new(date(2025, 3, 1), date(2025, 3, 1)).unwrap();
        assert_eq!(range.days(), 1);
        assert_eq!(range.dates().count(), 1);
    }

    #[test]
    fn comparison_windows_are_contiguous() {
        let periods = comparison_periods(date(2025, 3, 14), 7).unwrap();
        assert_eq!(periods.current.since, date(2025, 3, 8));
        assert_eq!(periods.current.until, date(2025, 3, 14));
        assert_eq!(periods.previous.since, date(2025, 3, 1));
        assert_eq!(periods.previous.until, date(2025, 3, 7));
        assert_eq!(periods.current.days(), periods.previous.days());
    }

    #[test]
    fn comparison_windows_cross_month_boundary() {
        let periods = comparison_periods(date(2025, 3, 2), 3).unwrap();
        assert_eq!(periods.current.since, date(2025, 2, 28));
        assert_eq!(periods.previous.until, date(2025, 2, 27));
        assert_eq!(periods.previous.since, date(2025, 2, 25));
    }

    #[test]
    fn zero_length_period_rejected() {
        assert!(matches!(
            comparison_periods(date(2025, 3, 2), 0),
            Err(DiagnoseError::InvalidPeriodLength(0))
        ));
    }

    #[test]
    fn period_reaching_past_calendar_start_rejected() {
        assert!(matches!(
            comparison_periods(date(2025, 3, 14), 200_000_000),
            Err(DiagnoseError::InvalidPeriodLength(200_000_000))
        ));
        assert!(matches!(
            comparison_periods(date(2025, 3, 14), i64::MAX),
            Err(DiagnoseError::InvalidPeriodLength(i64::MAX))
        ));
        assert!(matches!(
            trailing_periods(date(2025, 3, 14), 100_000_000, 4),
            Err(DiagnoseError::InvalidPeriodLength(100_000_000))
        ));
    }

    #[test]
    fn preceding_stops_at_earliest_date() {
        let first = TimeRange::new(NaiveDate::MIN, NaiveDate::MIN).unwrap();
        assert_eq!(first.preceding(), None);
        let range = TimeRange::new(date(2025, 3, 8), date(2025, 3, 14)).unwrap();
        let prev = range.preceding().unwrap();
        assert_eq!(prev.since, date(2025, 3, 1));
        assert_eq!(prev.until, date(2025, 3, 7));
    }

    #[test]
    fn trailing_periods_most_recent_first() {
        let periods = trailing_periods(date(2025, 3, 28), 7, 4).unwrap();
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].until, date(2025, 3, 28));
        assert_eq!(periods[3].since, date(2025, 3, 1));
        for pair in periods.windows(2) {
            assert_eq!(pair[1].until + Duration::days(1), pair[0].since);
        }
    }
}
