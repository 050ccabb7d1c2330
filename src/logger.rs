use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{LogConfig, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// Where log files go when the configuration does not say.
pub fn default_log_location() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("Blackblog")
        .join("log")
        .join("blackblog.log")
}

fn console_sink(stream: StdStream, filter: LevelFilter) -> spdlog::Result<Arc<StdStreamSink>> {
    Ok(Arc::new(StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(filter)
        .build()?))
}

/// Installs the blog logger as the default one. Files rotate daily at midnight.
pub fn configure_logger(log: &LogConfig) -> spdlog::Result<()> {
    let mut builder = Logger::builder();
    builder.name("blackblog");

    let location = log.location.clone().unwrap_or_else(default_log_location);
    builder.sink(Arc::new(RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(log.max_files)
        .rotate_on_open(false)
        .build()?));

    // Warnings and worse go to stderr, the rest to stdout
    if log.log_to_console {
        builder.sink(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(Level::Warn))?);
        builder.sink(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(Level::Warn))?);
    }

    let logger = Arc::new(builder
        .level_filter(LevelFilter::MoreSevereEqual(log.level.into()))
        .flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?);
    logger.set_flush_period(Some(Duration::from_secs(2)));

    spdlog::set_default_logger(logger);
    Ok(())
}
