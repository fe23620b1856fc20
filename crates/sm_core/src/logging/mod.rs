//! Logging setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events:
//! - `trace`: skipped cue blocks and boundary corrections
//! - `debug`: cache hits, evictions, discarded stale loads
//! - `info`/`warn`: loaded files and read failures
//!
//! Hosts call one of the init functions once at startup.

mod types;

pub use types::LogLevel;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Like [`init_tracing`], plus a daily rolling log file in `logs_dir`.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the host.
pub fn init_file_tracing(logs_dir: impl AsRef<Path>, default_level: LogLevel) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(logs_dir, "subtitle-manager.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    guard
}

/// Initialize from the `[logging]` config section.
///
/// Returns the file writer guard when file logging is enabled.
pub fn init_from_settings(settings: &LoggingSettings) -> Option<WorkerGuard> {
    if settings.file_logging {
        Some(init_file_tracing(&settings.logs_folder, settings.level))
    } else {
        init_tracing(settings.level);
        None
    }
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
