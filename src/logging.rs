//! Tracing subscriber setup driven by [`LoggingEnvConfig`]

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingEnvConfig;
use crate::error::Error;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingEnvConfig) -> Result<(), Error> {
    let level = config.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::Logging(format!("Invalid log filter '{}': {}", level, e)))?;
    let ansi = config.enable_colors.unwrap_or(true);

    let builder = fmt().with_env_filter(filter).with_ansi(ansi).with_target(false);
    let result = match config.format.as_deref().unwrap_or("compact") {
        "json" => builder.json().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };

    result.map_err(|e| Error::Logging(e.to_string()))
}
