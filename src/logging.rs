use std::fs;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::paths;

/// Initialize structured logging.
///
/// Sets up:
/// - File output: daily-rolling `assistant.*.log` files in `{data_dir}/logs`,
///   keeping the latest 5.
/// - Console output on stderr. Stdout carries the JSON-line protocol and
///   must stay clean.
/// - Environment filter: defaults to `info`, configurable via `RUST_LOG`.
///
/// Falls back to console-only logging when the log directory is unusable.
pub fn init() {
    let log_dir = paths::get_log_dir();
    let _ = fs::create_dir_all(&log_dir);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn,mio=warn,symphonia=warn"));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("assistant")
        .filename_suffix("log")
        .max_log_files(5)
        .build(&log_dir);

    match file_appender {
        Ok(appender) => {
            let file_layer = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(console_layer)
                .try_init();

            tracing::info!(log_dir = %log_dir.display(), "Logger initialized");
        }
        Err(e) => {
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .try_init();

            tracing::warn!("File logging disabled: {}", e);
        }
    }
}
