use crate::DocketResult;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the process-wide subscriber: env-driven filter (default `info`),
/// formatted output and the error layer that lets `DocketError` capture span traces.
pub fn init_tracing() -> DocketResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| crate::err!("Failed to install tracing subscriber: {}", e))
}
