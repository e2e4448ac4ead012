//! Process context
//!
//! A [`FrameworkContext`] captures exactly one [`ServiceProvider`] and exposes
//! typed accessors over it. Lifecycle is `Uninitialized -> Built`; there is no
//! way back, and a second `build` is rejected with
//! [`FrameworkError::AlreadyBuilt`] leaving the captured provider untouched.
//!
//! [`Framework`] is the process-wide instance. Code that wants isolation
//! (tests, embedding) can own a `FrameworkContext` directly.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::configuration::Configuration;
use crate::construction::FrameworkConstruction;
use crate::container::ServiceProvider;
use crate::environment::FrameworkEnvironment;
use crate::errors::FrameworkError;
use crate::exceptions::ExceptionHandler;
use crate::logging::{LogLevel, Logger, LoggerFactory};

pub const DEFAULT_PRODUCT_NAME: &str = "Dna Framework";

static FRAMEWORK: FrameworkContext = FrameworkContext::new();

pub struct FrameworkContext {
    provider: OnceCell<ServiceProvider>,
    product_name: &'static str,
}

impl FrameworkContext {
    pub const fn new() -> Self {
        Self::with_product_name(DEFAULT_PRODUCT_NAME)
    }

    /// `product_name` prefixes the startup line
    pub const fn with_product_name(product_name: &'static str) -> Self {
        Self {
            provider: OnceCell::new(),
            product_name,
        }
    }

    pub fn product_name(&self) -> &'static str {
        self.product_name
    }

    /// Builds `construction` and captures the provider
    ///
    /// With `log_started` the logger and environment are resolved before the
    /// provider is captured, so a construction missing either leaves the
    /// context unbuilt. The construction is handed back for further
    /// configuration; later changes to it do not reach the captured provider.
    pub fn build(
        &self,
        construction: FrameworkConstruction,
        log_started: bool,
    ) -> Result<FrameworkConstruction, FrameworkError> {
        if self.is_built() {
            return Err(FrameworkError::AlreadyBuilt);
        }

        let provider = construction.build();
        let startup = if log_started {
            let logger = provider.resolve::<dyn Logger>()?;
            let environment = provider.resolve::<FrameworkEnvironment>()?;
            Some((logger, environment))
        } else {
            None
        };

        self.provider
            .set(provider)
            .map_err(|_| FrameworkError::AlreadyBuilt)?;

        if let Some((logger, environment)) = startup {
            logger.log(
                LogLevel::Critical,
                &startup_message(self.product_name, &environment),
            );
        }

        Ok(construction)
    }

    pub fn is_built(&self) -> bool {
        self.provider.get().is_some()
    }

    pub fn provider(&self) -> Result<&ServiceProvider, FrameworkError> {
        self.provider.get().ok_or(FrameworkError::NotBuilt)
    }

    pub fn configuration(&self) -> Result<Arc<Configuration>, FrameworkError> {
        self.required::<Configuration>()
    }

    pub fn logger(&self) -> Result<Arc<dyn Logger>, FrameworkError> {
        self.required::<dyn Logger>()
    }

    pub fn logger_factory(&self) -> Result<Arc<dyn LoggerFactory>, FrameworkError> {
        self.required::<dyn LoggerFactory>()
    }

    pub fn environment(&self) -> Result<Arc<FrameworkEnvironment>, FrameworkError> {
        self.required::<FrameworkEnvironment>()
    }

    pub fn exception_handler(&self) -> Result<Arc<dyn ExceptionHandler>, FrameworkError> {
        self.required::<dyn ExceptionHandler>()
    }

    /// Any registered service; `Ok(None)` when it was never registered
    pub fn service<T>(&self) -> Result<Option<Arc<T>>, FrameworkError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.provider()?.get::<T>())
    }

    fn required<T>(&self) -> Result<Arc<T>, FrameworkError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.provider()?.resolve::<T>()?)
    }
}

impl Default for FrameworkContext {
    fn default() -> Self {
        Self::new()
    }
}

fn startup_message(product_name: &str, environment: &FrameworkEnvironment) -> String {
    format!("{} started in {}...", product_name, environment.name())
}

/// The process-wide framework context
pub struct Framework;

impl Framework {
    pub fn context() -> &'static FrameworkContext {
        &FRAMEWORK
    }

    pub fn build(
        construction: FrameworkConstruction,
        log_started: bool,
    ) -> Result<FrameworkConstruction, FrameworkError> {
        FRAMEWORK.build(construction, log_started)
    }

    pub fn is_built() -> bool {
        FRAMEWORK.is_built()
    }

    pub fn provider() -> Result<&'static ServiceProvider, FrameworkError> {
        FRAMEWORK.provider()
    }

    pub fn configuration() -> Result<Arc<Configuration>, FrameworkError> {
        FRAMEWORK.configuration()
    }

    pub fn logger() -> Result<Arc<dyn Logger>, FrameworkError> {
        FRAMEWORK.logger()
    }

    pub fn logger_factory() -> Result<Arc<dyn LoggerFactory>, FrameworkError> {
        FRAMEWORK.logger_factory()
    }

    pub fn environment() -> Result<Arc<FrameworkEnvironment>, FrameworkError> {
        FRAMEWORK.environment()
    }

    pub fn exception_handler() -> Result<Arc<dyn ExceptionHandler>, FrameworkError> {
        FRAMEWORK.exception_handler()
    }

    pub fn service<T>() -> Result<Option<Arc<T>>, FrameworkError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        FRAMEWORK.service::<T>()
    }
}
