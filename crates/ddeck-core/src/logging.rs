//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, ResultExt};

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "DDECK_LOG";

const LOG_FILE_NAME: &str = "ddeck.log";

/// Filter used when `DDECK_LOG` is unset. `ddeck` covers the binary and
/// every `ddeck_*` crate by target prefix.
const DEFAULT_FILTER: &str = "deploy_deck=info,ddeck=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/deploy-deck/logs/` so that stdout stays
/// free for device listings and NDJSON events.
/// Log level is controlled by the `DDECK_LOG` environment variable.
///
/// # Examples
/// ```bash
/// DDECK_LOG=debug ddeck watch
/// DDECK_LOG=ddeck_daemon=trace ddeck list
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("deploy-deck starting");
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("deploy-deck").join("logs"))
}

/// Get the log file path for the current day
///
/// Daily rotation suffixes the file with the UTC date.
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    let date = chrono::Utc::now().format("%Y-%m-%d");
    Ok(dir.join(format!("{}.{}", LOG_FILE_NAME, date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_lives_under_app_dir() {
        let path = get_current_log_file().unwrap();
        assert!(path.parent().unwrap().ends_with("deploy-deck/logs"));

        let file_name = path.file_name().unwrap().to_string_lossy();
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(file_name, format!("ddeck.log.{}", date));
    }

    #[test]
    fn test_default_filter_enables_binary_target() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("ddeck=info"));
        assert!(rendered.contains("deploy_deck=info"));
    }
}
