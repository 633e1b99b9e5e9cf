//! Diagnostic context assembly.
//!
//! Fetches the optional data advisors and the economics model consume:
//! trailing history, sub-entity breakdowns, and revenue figures derived from
//! the compared snapshots. Nothing is fetched unless asked for.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use funnelscope_core::{
    comparison_periods, trailing_periods, DiagnoseError, DiagnosticContext, EntityLevel,
    FunnelSchema, MetricSnapshot, RevenueData, TimeRange,
};

use crate::client::{PlatformClient, SubEntityBreakdowns};
use crate::concurrency::gather_all_fail_fast;

/// Trailing periods fetched when none is configured.
pub const DEFAULT_HISTORY_PERIODS: usize = 4;

/// Which optional context to assemble for a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    #[serde(default)]
    pub historical_trends: bool,
    #[serde(default)]
    pub structural: bool,
    #[serde(default = "default_history_periods")]
    pub history_periods: usize,
}

fn default_history_periods() -> usize {
    DEFAULT_HISTORY_PERIODS
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            historical_trends: false,
            structural: false,
            history_periods: DEFAULT_HISTORY_PERIODS,
        }
    }
}

impl ContextOptions {
    pub fn with_history(mut self, periods: usize) -> Self {
        self.historical_trends = true;
        self.history_periods = periods;
        self
    }

    pub fn with_structural(mut self) -> Self {
        self.structural = true;
        self
    }

    /// True when no fetch-backed feature is requested.
    pub fn is_empty(&self) -> bool {
        !self.historical_trends && !self.structural
    }
}

/// Builds a [`DiagnosticContext`] for one entity.
pub struct ContextBuilder<'a> {
    client: &'a dyn PlatformClient,
    entity_id: &'a str,
    entity_level: EntityLevel,
    funnel: &'a FunnelSchema,
    reference_date: NaiveDate,
    period_days: i64,
    options: ContextOptions,
    snapshots: Option<(&'a MetricSnapshot, &'a MetricSnapshot)>,
    structural_window: Option<TimeRange>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        client: &'a dyn PlatformClient,
        entity_id: &'a str,
        entity_level: EntityLevel,
        funnel: &'a FunnelSchema,
        reference_date: NaiveDate,
        period_days: i64,
    ) -> Self {
        Self {
            client,
            entity_id,
            entity_level,
            funnel,
            reference_date,
            period_days,
            options: ContextOptions::default(),
            snapshots: None,
            structural_window: None,
        }
    }

    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    /// Supply the compared snapshots so revenue data can be derived.
    pub fn with_snapshots(
        mut self,
        current: &'a MetricSnapshot,
        previous: &'a MetricSnapshot,
    ) -> Self {
        self.snapshots = Some((current, previous));
        self
    }

    /// Window for sub-entity breakdowns. Defaults to the `period_days`
    /// ending at the reference date.
    pub fn with_structural_window(mut self, window: TimeRange) -> Self {
        self.structural_window = Some(window);
        self
    }

    /// Assemble the context.
    ///
    /// History and breakdowns are fetched concurrently. A failed history
    /// fetch fails the whole build; partial history is not used.
    pub async fn build(self) -> Result<DiagnosticContext, DiagnoseError> {
        let mut context = DiagnosticContext {
            revenue: self
                .snapshots
                .map(|(current, previous)| derive_revenue(current, previous, self.funnel)),
            ..Default::default()
        };

        if self.options.is_empty() {
            debug!(entity_id = self.entity_id, "no fetch-backed context requested");
            return Ok(context);
        }

        let (historical, structural) =
            futures::try_join!(self.fetch_history(), self.fetch_structure())?;
        context.historical = historical;
        if let Some(s) = structural {
            context.sub_entities = s.sub_entities;
            context.breakdowns = s.breakdowns;
            context.audience_overlap = s.audience_overlap;
            context.attribution_windows = s.attribution_windows;
        }

        info!(
            entity_id = self.entity_id,
            historical = context.historical.len(),
            sub_entities = context.sub_entities.len(),
            has_revenue = context.revenue.is_some(),
            "diagnostic context built"
        );
        Ok(context)
    }

    async fn fetch_history(&self) -> Result<Vec<MetricSnapshot>, DiagnoseError> {
        if !self.options.historical_trends || self.options.history_periods == 0 {
            return Ok(Vec::new());
        }
        let periods = trailing_periods(
            self.reference_date,
            self.period_days,
            self.options.history_periods,
        )?;
        let fetches = periods.iter().map(|range| {
            self.client
                .fetch_snapshot(self.entity_id, self.entity_level, range, self.funnel)
        });
        Ok(gather_all_fail_fast(fetches).await?)
    }

    async fn fetch_structure(&self) -> Result<Option<SubEntityBreakdowns>, DiagnoseError> {
        if !self.options.structural {
            return Ok(None);
        }
        if !self.client.supports_sub_entity_breakdowns() {
            debug!(
                source = self.client.source_name(),
                "structural analysis requested but client has no breakdowns"
            );
            return Ok(None);
        }
        let window = match self.structural_window {
            Some(window) => window,
            None => comparison_periods(self.reference_date, self.period_days)?.current,
        };
        let breakdowns = self
            .client
            .fetch_sub_entity_breakdowns(self.entity_id, self.entity_level, &window, self.funnel)
            .await?;
        Ok(Some(breakdowns))
    }
}

/// Revenue totals from both snapshots and the current average order value.
///
/// AOV is total revenue over primary-KPI conversions, undefined when either
/// is zero.
pub fn derive_revenue(
    current: &MetricSnapshot,
    previous: &MetricSnapshot,
    funnel: &FunnelSchema,
) -> RevenueData {
    let total_revenue = current.revenue(funnel);
    let conversions = current.count(&funnel.primary_kpi);
    let average_order_value = if total_revenue > 0.0 && conversions > 0.0 {
        Some(total_revenue / conversions)
    } else {
        None
    };
    RevenueData {
        average_order_value,
        total_revenue,
        previous_total_revenue: previous.revenue(funnel),
    }
}
