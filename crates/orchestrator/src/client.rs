//! Platform client contract.
//!
//! A platform client turns one ad platform's reporting API into normalized
//! [`MetricSnapshot`]s. Authentication, pagination, rate limiting and retries
//! all live behind this trait; the orchestrator only sees "resolves or fails".

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use funnelscope_core::{
    AudienceOverlap, Breakdowns, EntityLevel, FunnelSchema, MetricSnapshot, PlatformError,
    TimeRange,
};

/// Current and previous snapshots for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSnapshots {
    pub current: MetricSnapshot,
    pub previous: MetricSnapshot,
}

/// Structural data for the current window: child entities plus dimensional
/// breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubEntityBreakdowns {
    #[serde(default)]
    pub sub_entities: Vec<MetricSnapshot>,
    #[serde(default)]
    pub breakdowns: Breakdowns,
    #[serde(default)]
    pub audience_overlap: Vec<AudienceOverlap>,
    #[serde(default)]
    pub attribution_windows: BTreeMap<String, f64>,
}

/// Data source for one ad platform.
///
/// Implementations must not mutate the funnel they are given and must return
/// a zero-filled snapshot, not an error, when a period has no data.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Platform name, matching the registry's `metadata.source`.
    fn source_name(&self) -> &str;

    /// Fetch one entity's metrics for one period.
    async fn fetch_snapshot(
        &self,
        entity_id: &str,
        entity_level: EntityLevel,
        range: &TimeRange,
        funnel: &FunnelSchema,
    ) -> Result<MetricSnapshot, PlatformError>;

    /// Fetch both comparison periods together; either failure fails both.
    async fn fetch_comparison_snapshots(
        &self,
        entity_id: &str,
        entity_level: EntityLevel,
        current: &TimeRange,
        previous: &TimeRange,
        funnel: &FunnelSchema,
    ) -> Result<ComparisonSnapshots, PlatformError> {
        let (current, previous) = futures::try_join!(
            self.fetch_snapshot(entity_id, entity_level, current, funnel),
            self.fetch_snapshot(entity_id, entity_level, previous, funnel),
        )?;
        Ok(ComparisonSnapshots { current, previous })
    }

    /// Whether [`fetch_sub_entity_breakdowns`](Self::fetch_sub_entity_breakdowns) is implemented.
    fn supports_sub_entity_breakdowns(&self) -> bool {
        false
    }

    /// Fetch child entities and breakdowns for one period.
    async fn fetch_sub_entity_breakdowns(
        &self,
        _entity_id: &str,
        _entity_level: EntityLevel,
        _range: &TimeRange,
        _funnel: &FunnelSchema,
    ) -> Result<SubEntityBreakdowns, PlatformError> {
        Err(PlatformError::Unsupported {
            source_name: self.source_name().to_string(),
            capability: "sub_entity_breakdowns".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
        fail_previous: bool,
    }

    #[async_trait]
    impl PlatformClient for CountingClient {
        fn source_name(&self) -> &str {
            "counting"
        }

        async fn fetch_snapshot(
            &self,
            entity_id: &str,
            entity_level: EntityLevel,
            range: &TimeRange,
            _funnel: &FunnelSchema,
        ) -> Result<MetricSnapshot, PlatformError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_previous && call == 1 {
                return Err(PlatformError::Fetch("rate limited".into()));
            }
            Ok(MetricSnapshot::empty(entity_id, entity_level, *range).with_spend(100.0))
        }
    }

    fn funnel() -> FunnelSchema {
        FunnelSchema {
            stages: vec![],
            primary_kpi: "purchase".into(),
            roas_metric: None,
        }
    }

    fn ranges() -> (TimeRange, TimeRange) {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        (
            TimeRange::new(d(8), d(14)).unwrap(),
            TimeRange::new(d(1), d(7)).unwrap(),
        )
    }

    #[tokio::test]
    async fn comparison_fetches_both_periods() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
            fail_previous: false,
        };
        let (current, previous) = ranges();
        let f = funnel();
        let snaps = client
            .fetch_comparison_snapshots("act_1", EntityLevel::Account, &current, &previous, &f)
            .await
            .unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(snaps.current.period, current);
        assert_eq!(snaps.previous.period, previous);
    }

    #[tokio::test]
    async fn comparison_fails_when_either_fetch_fails() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
            fail_previous: true,
        };
        let (current, previous) = ranges();
        let f = funnel();
        let err = client
            .fetch_comparison_snapshots("act_1", EntityLevel::Account, &current, &previous, &f)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Fetch(_)));
    }

    #[tokio::test]
    async fn breakdowns_unsupported_by_default() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
            fail_previous: false,
        };
        let (current, _) = ranges();
        assert!(!client.supports_sub_entity_breakdowns());
        let err = client
            .fetch_sub_entity_breakdowns("act_1", EntityLevel::Account, &current, &funnel())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Unsupported { .. }));
    }
}
