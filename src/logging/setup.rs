use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: bracketed lines on stdout and, when
/// `log_dir` is given, the same lines (without ANSI colors) in a timestamped
/// file inside it.
///
/// Returns the log file path, if one was created.
pub fn setup_logging(log_dir: Option<&Path>) -> std::io::Result<Option<PathBuf>> {
    let Some(log_dir) = log_dir else {
        let stdout_layer = fmt::layer()
            .event_format(BracketedFormatter)
            .with_writer(std::io::stdout);

        tracing_subscriber::registry()
            .with(env_filter())
            .with(stdout_layer)
            .init();
        return Ok(None);
    };

    // Create log file with timestamp
    fs::create_dir_all(log_dir)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("scene_curator_{}.log", timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false); // Disable ANSI colors in file

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    info!("Log file created at: {:?}", log_path);
    Ok(Some(log_path))
}
