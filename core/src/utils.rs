use crate::errors::CoreError;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Parses a log level name (`error`, `warn`, `info`, `debug`, `trace` or
/// `off`), case-insensitively.
pub fn parse_log_level(level: &str) -> Result<LevelFilter, CoreError> {
    LevelFilter::from_str(level)
        .map_err(|e| CoreError::ConfigError(format!("Invalid log level {}: {}", level, e)))
}

/// Initializes a [`tracing`] subscriber depending on the environment.
/// [`EnvFilter`] is used with `level` as the default directive, so `RUST_LOG`
/// still overrides it.
///
/// # Log Formats
///
/// - `json` **JSON** is used when `JSON_LOGS` environment variable is set.
///   Otherwise a human readable format is used.
///
/// # Returns
///
/// Returns `Err` if `tracing` can't be initialized. Initializing a second
/// time is not an error and returns `Ok(())`.
pub fn initialize_logger(level: Option<LevelFilter>) -> Result<(), CoreError> {
    // Standard layer that will output human readable logs.
    let layer = fmt::layer().with_test_writer();
    // JSON layer that will output JSON formatted logs.
    let json_layer = fmt::layer::<Registry>().with_test_writer().json();

    let filter = match level {
        Some(level) => EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy(),
        None => EnvFilter::from_default_env(),
    };

    let res = if std::env::var("JSON_LOGS").is_ok() {
        tracing_subscriber::util::SubscriberInitExt::try_init(
            tracing_subscriber::registry().with(json_layer).with(filter),
        )
    } else {
        tracing_subscriber::util::SubscriberInitExt::try_init(
            tracing_subscriber::registry().with(layer).with(filter),
        )
    };

    if let Err(e) = res {
        // A second initialization keeps the first subscriber.
        if e.to_string() != "a global default trace dispatcher has already been set" {
            return Err(CoreError::ConfigError(e.to_string()));
        }

        tracing::trace!("Tracing is already initialized, skipping without errors...");
    };

    Ok(())
}
