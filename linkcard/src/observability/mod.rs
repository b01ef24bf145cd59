//! Observability utilities.

mod tracing;

pub use self::tracing::{ExtractionObserver, LoggingObserver, NoOpObserver, SpanTimer};

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Installs a global `tracing` subscriber.
///
/// Logs go to stderr. `RUST_LOG` takes precedence over `config.filter`.
/// Fails when a global subscriber is already set.
pub fn init_tracing(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}
