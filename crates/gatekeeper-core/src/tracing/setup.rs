//! Subscriber installation.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Variable holding per-crate directives, e.g.
/// `GATEKEEPER_LOG=gatekeeper_decision=debug,gatekeeper_privacy=warn`.
pub const LOG_ENV: &str = "GATEKEEPER_LOG";

const DEFAULT_DIRECTIVE: &str = "gatekeeper=info";

static INSTALLED: Once = Once::new();

/// Output shape of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with target, thread, and source location.
    #[default]
    Pretty,
    /// One JSON object per event, including the current span.
    Json,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber once. Later calls, in either format, are
/// no-ops; a subscriber installed by the host application is left alone.
pub fn init_with(format: LogFormat) {
    INSTALLED.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter());
        let _ = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_current_span(true))
                .try_init(),
        };
    });
}

/// [`init_with`] in the default human-readable format.
pub fn init_tracing() {
    init_with(LogFormat::Pretty);
}

/// [`init_with`] in JSON, for log shipping.
pub fn init_json_tracing() {
    init_with(LogFormat::Json);
}
