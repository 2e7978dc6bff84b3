//! Console logging for the `pipeline-roller` binary.
//!
//! Logs go to stdout only so the pipeline agent captures them with the rest
//! of the step output.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "AZURE_PIPELINES_LOG_LEVEL";

/// Log level names accepted on the command line and in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parses a level name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            "CRITICAL" => Some(LogLevel::Critical),
            _ => None,
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            // tracing has no level above ERROR
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }
}

/// The explicit level wins; otherwise the environment value is used, and
/// anything missing or unrecognized means INFO.
pub fn resolve_level(explicit: Option<LogLevel>, env_value: Option<&str>) -> LevelFilter {
    explicit
        .or_else(|| env_value.and_then(LogLevel::from_name))
        .unwrap_or(LogLevel::Info)
        .to_filter()
}

/// [`resolve_level`] against the process environment.
pub fn level_from_env(explicit: Option<LogLevel>) -> LevelFilter {
    let env_value = std::env::var(LOG_LEVEL_ENV).ok();
    resolve_level(explicit, env_value.as_deref())
}

/// Installs the global subscriber. Call once, at process start.
pub fn init(level: LevelFilter) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::default().add_directive(level.into()))
        .init();
}
