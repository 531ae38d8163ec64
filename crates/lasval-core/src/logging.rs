//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILE_NAME: &str = "lasval.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/las-validator/logs/` so that stdout
/// stays free for headless NDJSON events.
/// Log level is controlled by the `LASVAL_LOG` environment variable.
///
/// # Examples
/// ```bash
/// LASVAL_LOG=debug lasval validate well.las
/// LASVAL_LOG=lasval_proxy=trace lasval proxy
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env("LASVAL_LOG").unwrap_or_else(|_| {
        EnvFilter::new("las_validator=info,lasval_app=info,lasval_client=info,lasval_proxy=info,warn")
    });

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

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("LAS validator starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("las-validator").join("logs"))
}
