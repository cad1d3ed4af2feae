//! Subscriber setup for the `tracing` events emitted by the core.
//!
//! The filter is read from `ADVEVAL_LOG` (same syntax as `RUST_LOG`) and
//! falls back to `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "ADVEVAL_LOG";

/// Output format of the installed subscriber.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human readable lines.
    #[default]
    Pretty,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(false);
    let result = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    result.is_ok()
}
