//! Tracing initialisation for the labelgate binary.
//!
//! Output is split by stream:
//!
//! - stdout carries only the report written by [`crate::write_report`], so CI
//!   steps can capture or diff it.
//! - stderr carries every tracing event: the release found, per-page fetch
//!   progress at `debug`, one `warn` per invalid PR, and the final summary.
//!
//! `RUST_LOG` takes precedence over the level passed by the caller, e.g.
//! `RUST_LOG=labelgate_core=debug` shows pagination without raising the
//! verbosity of dependencies.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber, writing to stderr.
///
/// * `json`: emit newline-delimited JSON log lines instead of the compact
///   human format.
/// * `level`: default verbosity when `RUST_LOG` is unset or unparsable.
///
/// Only the first call takes effect; later calls are ignored.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
