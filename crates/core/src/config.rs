use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_i64(profile: &str, key: &str, default: i64) -> i64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub registry: RegistryConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `FUNNELSCOPE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("FUNNELSCOPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            registry: RegistryConfig::from_env_profiled(p),
            analysis: AnalysisConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  registry:  dir={}", self.registry.registry_dir.display());
        tracing::info!("  snapshots: dir={}", self.registry.snapshot_dir.display());
        tracing::info!(
            "  analysis:  period_days={}, history_periods={}, maturity_gap_points={}",
            self.analysis.period_days,
            self.analysis.history_periods,
            self.analysis.maturity_gap_points
        );
    }
}

// ── Registry ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory of funnel and benchmark YAML documents.
    pub registry_dir: PathBuf,
    /// Root of normalized snapshot JSON files for the file-backed client.
    pub snapshot_dir: PathBuf,
}

impl RegistryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            registry_dir: profiled_env_or(p, "FUNNELSCOPE_REGISTRY_DIR", "data/registry").into(),
            snapshot_dir: profiled_env_or(p, "FUNNELSCOPE_SNAPSHOT_DIR", "data/snapshots").into(),
        }
    }
}

// ── Analysis ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Length of each comparison window in days.
    pub period_days: i64,
    /// Trailing periods fetched for historical trend analysis.
    pub history_periods: usize,
    /// Maturity gap (percentage points) above which comparisons are flagged unsafe.
    pub maturity_gap_points: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period_days: 7,
            history_periods: 4,
            maturity_gap_points: 10.0,
        }
    }
}

impl AnalysisConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            period_days: profiled_env_i64(p, "FUNNELSCOPE_PERIOD_DAYS", d.period_days),
            history_periods: profiled_env_usize(
                p,
                "FUNNELSCOPE_HISTORY_PERIODS",
                d.history_periods,
            ),
            maturity_gap_points: profiled_env_f64(
                p,
                "FUNNELSCOPE_MATURITY_GAP_POINTS",
                d.maturity_gap_points,
            ),
        }
    }
}
