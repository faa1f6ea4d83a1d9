//! Process-wide log setup.
//!
//! Application code logs through the `log` macros; [`init`] forwards those
//! records into a `tracing-subscriber` formatter so output can be switched
//! between human-readable text and JSON lines.

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber. Call once, before anything logs.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    let filter = EnvFilter::try_new(&config.filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to build log filter")?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            let subscriber = registry.with(fmt::layer().json().with_target(true).with_current_span(false));
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Text => {
            let subscriber = registry.with(fmt::layer().with_target(true).compact());
            tracing::subscriber::set_global_default(subscriber)
        }
    }
    .context("Failed to install log subscriber")?;

    log::debug!("Logging initialised ({:?}, filter '{}')", config.format, config.filter);
    Ok(())
}
