//! Tracing bootstrap for the CLI binary.

use tracing_subscriber::EnvFilter;

/// Log to stderr so tool output on stdout stays machine-readable.
/// `RUST_LOG` overrides the default filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}
