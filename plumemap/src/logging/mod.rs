//! Tracing subscriber setup.
//!
//! Logs go to stderr. When a log directory is configured they are also
//! written to a daily-rolling file through a non-blocking writer; the
//! returned [`LoggingGuard`] must live until shutdown or buffered lines are
//! lost.
//!
//! `RUST_LOG` overrides the configured level when set. Timestamps are UTC
//! so formatting never depends on reading the local offset from a
//! multi-threaded process.

use std::path::PathBuf;

use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix of rolled log files.
pub const LOG_FILE_PREFIX: &str = "plumemap.log";

/// Accepted level names.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Filter directive: the crate at the configured level, dependencies at
    /// `warn` unless the level is more verbose.
    pub fn filter_directive(&self) -> String {
        let level = if is_valid_level(&self.level) {
            self.level.to_ascii_lowercase()
        } else {
            DEFAULT_LOG_LEVEL.to_string()
        };
        match level.as_str() {
            "trace" | "debug" => level,
            _ => format!("warn,plumemap={}", level),
        }
    }
}

/// Whether `level` names a tracing level.
pub fn is_valid_level(level: &str) -> bool {
    LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
}

fn log_timer() -> UtcTime<Rfc3339> {
    UtcTime::new(Rfc3339)
}

/// Keeps the file writer flushing. Drop at shutdown.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(log_timer())
        .with_target(false);

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_timer(log_timer())
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init()?;

            Ok(LoggingGuard { _file: Some(guard) })
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()?;

            Ok(LoggingGuard { _file: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::format::Writer;
    use tracing_subscriber::fmt::time::FormatTime;

    #[test]
    fn test_filter_directive() {
        assert_eq!(LoggingConfig::default().filter_directive(), "warn,plumemap=info");
        assert_eq!(
            LoggingConfig::default().with_level("DEBUG").filter_directive(),
            "debug"
        );
        assert_eq!(
            LoggingConfig::default().with_level("loud").filter_directive(),
            "warn,plumemap=info"
        );
    }

    #[test]
    fn test_level_validation() {
        assert!(is_valid_level("warn"));
        assert!(is_valid_level("Error"));
        assert!(!is_valid_level("verbose"));
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::default()
            .with_level("trace")
            .with_directory("/var/log/plumemap");
        assert_eq!(config.level, "trace");
        assert_eq!(config.directory, Some(PathBuf::from("/var/log/plumemap")));
    }

    #[test]
    fn test_timer_formats_from_worker_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let mut out = String::new();
                    log_timer().format_time(&mut Writer::new(&mut out)).unwrap();
                    out
                })
            })
            .collect();

        for handle in handles {
            let stamp = handle.join().unwrap();
            assert!(stamp.ends_with('Z'), "not a UTC timestamp: {}", stamp);
            assert!(stamp.contains('T'));
        }
    }
}
