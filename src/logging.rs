//! Logging setup for the checker binaries.
//!
//! `init_subscriber` wires tracing to stderr by default, or to a rolling
//! daily file under the user's cache directory when asked to. Safe to call
//! more than once; only the first call installs a subscriber, so tests that
//! share a process never panic on double initialization.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Folder the daily log files land in, if one can be determined.
fn log_folder() -> Option<PathBuf> {
    let project = ProjectDirs::from("de", "ipb", "homework_checker")?;
    let folder = project.cache_dir().join("logs");
    if let Err(err) = std::fs::create_dir_all(&folder) {
        eprintln!("Failed to create log folder '{}': {err}", folder.display());
        return None;
    }
    Some(folder)
}

/// Install the global tracing subscriber.
///
/// With `verbose` the level drops to `debug`, otherwise `info`; an explicit
/// `RUST_LOG` wins over both. With `log_to_file` the output goes to a daily
/// rolling `checker.log` instead of stderr.
pub fn init_subscriber(log_to_file: bool, verbose: bool) {
    INIT.call_once(|| {
        let level = if verbose { "debug" } else { "info" };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        if log_to_file && let Some(folder) = log_folder() {
            let appender = tracing_appender::rolling::daily(&folder, "checker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // The guard flushes on drop; leak it so it lives as long as the
            // process does.
            Box::leak(Box::new(guard));
            fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            tracing::debug!("Logging to '{}'.", folder.display());
        } else {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .init();
        }
        if verbose {
            tracing::debug!("Enable DEBUG logging.");
        }
    });
}
