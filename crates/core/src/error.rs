use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by a platform client while fetching snapshots.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Capability not supported by {source_name}: {capability}")]
    Unsupported {
        source_name: String,
        capability: String,
    },
}

/// Hard failures that reject a diagnostic run before or during analysis.
///
/// Per-source fetch failures inside an orchestration are not surfaced
/// through this type; they are recorded on the source outcome instead.
#[derive(Error, Debug)]
pub enum DiagnoseError {
    #[error("Invalid time range: since {since} is after until {until}")]
    InvalidTimeRange { since: NaiveDate, until: NaiveDate },

    #[error("Invalid period length: {0} days (must be at least 1)")]
    InvalidPeriodLength(i64),

    #[error("No funnel registered for source '{source_name}' and vertical '{vertical}'")]
    UnknownFunnel { source_name: String, vertical: String },

    #[error("No platform client configured for source '{0}'")]
    UnknownSource(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result alias for diagnostic operations.
pub type Result<T> = std::result::Result<T, DiagnoseError>;
