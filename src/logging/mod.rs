//! Logger abstractions handed out by the framework
//!
//! `Logger` and `LoggerFactory` are the seams the framework depends on. The
//! default implementation forwards to the `log` facade; `init_logging`
//! installs `env_logger` as the backend.

mod memory;

pub use memory::{LogRecord, MemoryLogger, MemoryLoggerFactory};

use std::fmt;
use std::panic::Location;
use std::str::FromStr;
use std::sync::Arc;

use crate::configuration::Configuration;

/// Default category for the framework's own logger
pub const DEFAULT_CATEGORY: &str = "dna";

const DEFAULT_LEVEL: &str = "info";

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `log` has no critical level, critical maps to error
    pub fn to_log_level(self) -> log::Level {
        match self {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Information => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error | LogLevel::Critical => log::Level::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Information => "information",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" | "information" => Ok(LogLevel::Information),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" | "fatal" => Ok(LogLevel::Critical),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// A logger accepting a severity and message text
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn is_enabled(&self, _level: LogLevel) -> bool {
        true
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn information(&self, message: &str) {
        self.log(LogLevel::Information, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}

impl dyn Logger {
    /// Logs at `level` with the caller's source location appended
    #[track_caller]
    pub fn log_source(&self, level: LogLevel, message: &str) {
        let caller = Location::caller();
        self.log(level, &with_location(message, caller));
    }

    #[track_caller]
    pub fn log_critical_source(&self, message: &str) {
        self.log_source(LogLevel::Critical, message);
    }
}

fn with_location(message: &str, location: &Location<'_>) -> String {
    format!("{} [{}:{}]", message, location.file(), location.line())
}

/// Creates loggers for a category
pub trait LoggerFactory: Send + Sync {
    fn create_logger(&self, category: &str) -> Arc<dyn Logger>;
}

/// Logger forwarding to the `log` facade, category used as target
#[derive(Debug, Clone)]
pub struct LogCrateLogger {
    category: String,
}

impl LogCrateLogger {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl Logger for LogCrateLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Critical {
            log::log!(target: self.category.as_str(), level.to_log_level(), "[critical] {}", message);
        } else {
            log::log!(target: self.category.as_str(), level.to_log_level(), "{}", message);
        }
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        log::log_enabled!(target: self.category.as_str(), level.to_log_level())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateLoggerFactory;

impl LoggerFactory for LogCrateLoggerFactory {
    fn create_logger(&self, category: &str) -> Arc<dyn Logger> {
        Arc::new(LogCrateLogger::new(category))
    }
}

/// Installs `env_logger` with the level from `logging:level`
///
/// `RUST_LOG` still takes precedence. Calling this more than once is harmless.
pub fn init_logging(configuration: &Configuration) {
    let level = configuration
        .get_str("logging:level")
        .unwrap_or(DEFAULT_LEVEL);
    let level = match level.parse::<LogLevel>() {
        Ok(parsed) => parsed.to_log_level().as_str().to_ascii_lowercase(),
        Err(_) => DEFAULT_LEVEL.to_string(),
    };

    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing backend");
    }
}
