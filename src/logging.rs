use std::env;
use std::io;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "WORKOUT_SCHEDULE_LOG";

static LOGGING_INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global stderr subscriber used by the binaries.
///
/// The first call wins; later calls are no-ops. `default_directive` applies
/// when neither `WORKOUT_SCHEDULE_LOG` nor `RUST_LOG` is set.
pub fn init_logging(default_directive: &str) -> Result<(), LoggingError> {
    if LOGGING_INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = build_filter(default_directive)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    let _ = LOGGING_INSTALLED.set(());
    Ok(())
}

fn build_filter(default_directive: &str) -> Result<EnvFilter, ParseError> {
    if let Ok(directives) = env::var(LOG_ENV) {
        if !directives.trim().is_empty() {
            return EnvFilter::try_new(directives);
        }
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive),
    }
}
