//! In-memory logger, handy for asserting on log output

use parking_lot::Mutex;
use std::sync::Arc;

use super::{LogLevel, Logger, LoggerFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub category: String,
    pub level: LogLevel,
    pub message: String,
}

/// Records every message; clones share the same buffer
#[derive(Debug, Clone)]
pub struct MemoryLogger {
    category: String,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new(category: impl Into<String>) -> Self {
        Self::with_buffer(category, Arc::default())
    }

    fn with_buffer(category: impl Into<String>, records: Arc<Mutex<Vec<LogRecord>>>) -> Self {
        Self {
            category: category.into(),
            records,
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            category: self.category.clone(),
            level,
            message: message.to_string(),
        });
    }
}

/// Factory whose loggers all write into one shared buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryLoggerFactory {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLoggerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }
}

impl LoggerFactory for MemoryLoggerFactory {
    fn create_logger(&self, category: &str) -> Arc<dyn Logger> {
        Arc::new(MemoryLogger::with_buffer(category, self.records.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_loggers_share_buffer() {
        let factory = MemoryLoggerFactory::new();
        factory.create_logger("a").information("first");
        factory.create_logger("b").warning("second");

        let records = factory.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "a");
        assert_eq!(records[1].level, LogLevel::Warning);
        assert_eq!(factory.messages(), vec!["first", "second"]);
    }
}
