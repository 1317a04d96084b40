//! # Structured Logging
//!
//! Initializes the `tracing` subscriber with a configurable format (JSON or
//! pretty-printed) and `RUST_LOG`-based filtering.
//!
//! All log output goes to stderr. Stdout carries command results only
//! (signed records, addresses, digests) so it can be piped.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "stamp_cli=info,stamp_protocol=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Initialize the global tracing subscriber.
///
/// Call once, early in `main()`.
///
/// # Environment
///
/// `RUST_LOG` overrides `default_filter` when set, e.g.:
///
/// ```text
/// RUST_LOG=stamp_protocol=debug stamp verify --input signed.json
/// ```
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(format = ?format, "logging initialized");
}
