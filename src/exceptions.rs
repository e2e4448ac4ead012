//! Pluggable handling for errors that reach the top of the application

use std::error::Error;
use std::sync::Arc;

use crate::logging::{LogLevel, Logger};

/// Policy object for unhandled errors
pub trait ExceptionHandler: Send + Sync {
    fn handle_error(&self, error: &(dyn Error + 'static));
}

/// Logs the error and its source chain at critical level
pub struct BaseExceptionHandler {
    logger: Arc<dyn Logger>,
}

impl BaseExceptionHandler {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl ExceptionHandler for BaseExceptionHandler {
    fn handle_error(&self, error: &(dyn Error + 'static)) {
        self.logger.log(LogLevel::Critical, &describe(error));
    }
}

/// `outer: caused by: inner: caused by: root`
pub fn describe(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
