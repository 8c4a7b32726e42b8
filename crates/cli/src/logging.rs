use mddb_core::config::LoggingConfig;
use std::fs::{self, File};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

/// Install the global subscriber: a stderr layer at `level`, plus a file
/// layer at `file_level` (falling back to `level`) when `file` is set.
/// `RUST_LOG` directives apply on top of both.
pub fn init(cfg: &LoggingConfig) -> io::Result<()> {
    let stderr_level = parse_level(&cfg.level).unwrap_or(LevelFilter::INFO);
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(stderr_level));

    let file_layer = match cfg.file {
        Some(ref path) => {
            let file_level = cfg
                .file_level
                .as_deref()
                .and_then(parse_level)
                .or_else(|| parse_level(&cfg.level))
                .unwrap_or(LevelFilter::DEBUG);

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let (writer, guard) = tracing_appender::non_blocking(File::create(path)?);

            // Dropping the guard stops the writer thread
            if let Ok(mut g) = LOG_GUARD.lock() {
                *g = Some(guard);
            }

            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter(file_level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();
    Ok(())
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}
