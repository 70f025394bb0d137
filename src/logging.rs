//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily rotating file so they never draw over the table.
//! The level is taken from `RUST_LOG`, falling back to `deskgrid=info,warn`.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "deskgrid=info,warn";

/// Filter used by `--verbose` when RUST_LOG is not set.
const VERBOSE_LOG_FILTER: &str = "deskgrid=debug,warn";

/// Initialize the logging system.
///
/// Logs are written to `deskgrid.log` in the platform's local data
/// directory (`~/.local/share/deskgrid/logs/` on Linux). `RUST_LOG` always
/// wins; otherwise `verbose` selects debug output for this crate. Use
/// `RUST_LOG=deskgrid=trace` to see every keystroke and discarded response.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// if a global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "deskgrid.log");

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter(verbose));

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "deskgrid starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("deskgrid").join("logs"))
}

/// Where log files are written, for display in error messages.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("deskgrid shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = log_directory().unwrap();
        assert!(dir.ends_with("deskgrid/logs"));
    }

    #[test]
    fn test_default_filter_by_verbosity() {
        assert_eq!(default_filter(false), "deskgrid=info,warn");
        assert_eq!(default_filter(true), "deskgrid=debug,warn");
    }
}
