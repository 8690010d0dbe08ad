//! Tracing/logging initialization.
//!
//! One JSON object per line. Fields of the innermost span (e.g. the
//! `product_id` a store call was instrumented with) are attached to each event.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparseable. sqlx logs every statement at
/// `info`, which drowns out request logs, so it is held to `warn`.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(default_filter = DEFAULT_FILTER, "tracing subscriber installed");
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
