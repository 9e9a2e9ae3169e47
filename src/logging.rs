//! Structured logging setup.
//!
//! The provider logs through the `tracing` ecosystem. Everything goes to
//! **stderr**: stdout belongs to the host handshake and must stay clean.
//! Filtering follows the `RUST_LOG` environment variable, e.g.
//!
//! ```bash
//! RUST_LOG=info ./lakeshore-provider
//! RUST_LOG=lakeshore_provider=debug ./lakeshore-provider
//! ```
//!
//! The retry layer logs rejected tokens and rate-limit waits at `warn`, and
//! every API exchange at `debug`; the service-account password workaround
//! logs a `warn` each time it runs so it can be spotted and removed once
//! the server endpoint is fixed.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
}

/// Initialize the default logging subscriber.
///
/// Reads `RUST_LOG`, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level used when `RUST_LOG` is
/// not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning `false` if a subscriber was already
/// set. Useful in tests, where the process may initialize more than once.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}
