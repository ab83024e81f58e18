//! Log output for hosts that embed the MAP server.
//!
//! The library logs through the `log` facade and opens `tracing` spans
//! around encoding work. [`init`] routes both into one `tracing-subscriber`
//! formatter.

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Installs the global subscriber and the `log` bridge.
///
/// Calling it more than once, or after the host installed its own
/// subscriber or logger, leaves the existing setup in place.
pub fn init(format: LogFormat) {
    let installed = match format {
        LogFormat::Text => install(
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer().with_target(true)),
        ),
        LogFormat::Json => install(
            tracing_subscriber::registry().with(env_filter()).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true),
            ),
        ),
    };
    if !installed {
        return;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log records not bridged: {}", e);
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install<S>(subscriber: S) -> bool
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
