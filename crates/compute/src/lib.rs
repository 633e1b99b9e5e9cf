//! Funnel diagnosis computations.
//!
//! Pure, synchronous analysis over metric snapshots: significance tests,
//! severity classification, data maturity, economic impact, and the funnel
//! walk that ties them together.

pub mod advisor;
pub mod economics;
pub mod maturity;
pub mod severity;
pub mod significance;
pub mod walker;

pub use advisor::{Advisor, AdvisorRef, AdvisorRegistry};
pub use maturity::{estimate_undercount, inflate_count, MaturityModel};
pub use severity::{classify_severity, MetricDirection};
pub use significance::{
    account_variance, is_significant_change, minimum_detectable_effect, percent_change,
    resolve_variance, z_score, ResolvedVariance,
};
pub use walker::{analyze_funnel, find_bottleneck, maturity_finding, FunnelWalk};
