//! funnel-diagnose: period-over-period funnel diagnosis across ad platforms.
//!
//! Loads the funnel/benchmark registry, reads normalized snapshots from the
//! snapshot directory, runs one funnel walk per `--source`, and prints the
//! correlated result.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use funnelscope_compute::{AdvisorRegistry, MaturityModel};
use funnelscope_core::config::load_dotenv;
use funnelscope_core::Config;
use funnelscope_orchestrator::{
    ContextOptions, FileClient, OrchestrationRequest, Orchestrator, SourceConfig,
};
use funnelscope_rules::Registry;

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

/// Diagnose paid-media funnels across platforms.
#[derive(Parser, Debug)]
#[command(name = "funnel-diagnose", version, about)]
struct Cli {
    /// Source to diagnose, as source:vertical:entity_id[:entity_level]. Repeatable.
    #[arg(long = "source", required = true)]
    sources: Vec<SourceConfig>,

    /// Last day of the current comparison window (YYYY-MM-DD).
    #[arg(long, env = "FUNNELSCOPE_REFERENCE_DATE")]
    reference_date: NaiveDate,

    /// Comparison window length in days. Defaults to FUNNELSCOPE_PERIOD_DAYS.
    #[arg(long)]
    period_days: Option<i64>,

    /// Date the data was pulled; enables the data-maturity check.
    #[arg(long, env = "FUNNELSCOPE_AS_OF")]
    as_of: Option<NaiveDate>,

    /// Registry directory. Defaults to FUNNELSCOPE_REGISTRY_DIR.
    #[arg(long)]
    registry_dir: Option<PathBuf>,

    /// Snapshot directory. Defaults to FUNNELSCOPE_SNAPSHOT_DIR.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Fetch trailing history for account-level variance and z-scores.
    #[arg(long)]
    historical: bool,

    /// Fetch sub-entity and dimensional breakdowns.
    #[arg(long)]
    structural: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let registry_dir = cli.registry_dir.unwrap_or(config.registry.registry_dir);
    let snapshot_dir = cli.snapshot_dir.unwrap_or(config.registry.snapshot_dir);
    let period_days = cli.period_days.unwrap_or(config.analysis.period_days);

    let (registry, loads) = Registry::load_dir(&registry_dir)
        .with_context(|| format!("loading registry from {}", registry_dir.display()))?;
    let failed = loads.iter().filter(|l| l.status.is_failed()).count();
    if failed > 0 {
        warn!(failed, "some registry documents failed to load");
    }
    info!(
        funnels = registry.funnel_count(),
        benchmarks = registry.benchmark_count(),
        "registry loaded"
    );

    let mut options = ContextOptions::default();
    if cli.historical {
        options = options.with_history(config.analysis.history_periods);
    }
    if cli.structural {
        options = options.with_structural();
    }

    let mut request = OrchestrationRequest::new(cli.reference_date, period_days);
    request.as_of = cli.as_of;
    for source in cli.sources {
        request = request.with_source(source.with_context(options.clone()));
    }

    let advisors = AdvisorRegistry::new();
    let mut orchestrator = Orchestrator::new(&registry, &advisors).with_maturity_model(
        MaturityModel::new().with_gap_threshold(config.analysis.maturity_gap_points),
    );
    let source_names: BTreeSet<&str> = request.sources.iter().map(|s| s.source.as_str()).collect();
    for name in source_names {
        orchestrator = orchestrator.with_client(Arc::new(FileClient::new(&snapshot_dir, name)));
    }

    let result = orchestrator.run(&request).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Summary => print!("{}", result.executive_summary),
    }
    Ok(())
}
