//! Advisor plugin contract and the (source, vertical) advisor registry.
//!
//! An advisor inspects the walker's stage and drop-off diagnostics and
//! returns zero or more findings. Advisors are pure and infallible: when
//! there is nothing to say they return an empty vector.

use std::collections::HashMap;
use std::sync::Arc;

use funnelscope_core::{DiagnosticContext, Finding, FunnelDropoff, MetricSnapshot, StageDiagnostic};

/// A pluggable heuristic producing findings from one walk.
pub trait Advisor: Send + Sync {
    fn advise(
        &self,
        stages: &[StageDiagnostic],
        dropoffs: &[FunnelDropoff],
        current: &MetricSnapshot,
        previous: &MetricSnapshot,
        context: Option<&DiagnosticContext>,
    ) -> Vec<Finding>;
}

impl<F> Advisor for F
where
    F: Fn(
            &[StageDiagnostic],
            &[FunnelDropoff],
            &MetricSnapshot,
            &MetricSnapshot,
            Option<&DiagnosticContext>,
        ) -> Vec<Finding>
        + Send
        + Sync,
{
    fn advise(
        &self,
        stages: &[StageDiagnostic],
        dropoffs: &[FunnelDropoff],
        current: &MetricSnapshot,
        previous: &MetricSnapshot,
        context: Option<&DiagnosticContext>,
    ) -> Vec<Finding> {
        self(stages, dropoffs, current, previous, context)
    }
}

/// Shared handle to an advisor.
pub type AdvisorRef = Arc<dyn Advisor>;

/// Ordered advisor lists keyed by (source, vertical).
///
/// Assembled at startup and read-only afterwards.
#[derive(Default, Clone)]
pub struct AdvisorRegistry {
    advisors: HashMap<(String, String), Vec<AdvisorRef>>,
}

impl AdvisorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an advisor to the (source, vertical) list, preserving order.
    pub fn register(&mut self, source: &str, vertical: &str, advisor: AdvisorRef) {
        self.advisors
            .entry((source.to_string(), vertical.to_string()))
            .or_default()
            .push(advisor);
    }

    /// Advisors for a pair; empty when none are registered.
    pub fn advisors(&self, source: &str, vertical: &str) -> &[AdvisorRef] {
        self.advisors
            .get(&(source.to_string(), vertical.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.advisors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AdvisorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .advisors
            .iter()
            .map(|((s, v), list)| format!("{}/{} ({})", s, v, list.len()))
            .collect();
        keys.sort();
        f.debug_struct("AdvisorRegistry").field("advisors", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnelscope_core::Severity;

    fn noop(
        _: &[StageDiagnostic],
        _: &[FunnelDropoff],
        _: &MetricSnapshot,
        _: &MetricSnapshot,
        _: Option<&DiagnosticContext>,
    ) -> Vec<Finding> {
        Vec::new()
    }

    fn always_info(
        _: &[StageDiagnostic],
        _: &[FunnelDropoff],
        _: &MetricSnapshot,
        _: &MetricSnapshot,
        _: Option<&DiagnosticContext>,
    ) -> Vec<Finding> {
        vec![Finding::new(Severity::Info, "a", "first")]
    }

    #[test]
    fn registry_preserves_order_per_pair() {
        let mut registry = AdvisorRegistry::new();
        registry.register("meta", "ecommerce", Arc::new(always_info));
        registry.register("meta", "ecommerce", Arc::new(noop));
        registry.register("google", "ecommerce", Arc::new(noop));

        assert_eq!(registry.advisors("meta", "ecommerce").len(), 2);
        assert_eq!(registry.advisors("google", "ecommerce").len(), 1);
        assert!(registry.advisors("tiktok", "ecommerce").is_empty());
        assert_eq!(registry.len(), 3);
    }
}
