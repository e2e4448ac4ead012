//! Framework construction
//!
//! The mutable builder populated during startup. It owns the service
//! registrations and produces a fresh [`ServiceProvider`] on every `build`.

use std::sync::Arc;

use crate::configuration::{Configuration, ConfigurationBuilder};
use crate::container::{ServiceCollection, ServiceDescriptor, ServiceProvider};
use crate::environment::FrameworkEnvironment;
use crate::errors::ConfigError;
use crate::exceptions::{BaseExceptionHandler, ExceptionHandler};
use crate::logging::{LogCrateLoggerFactory, Logger, LoggerFactory, DEFAULT_CATEGORY};

pub struct FrameworkConstruction {
    services: ServiceCollection,
    environment: Arc<FrameworkEnvironment>,
    configuration: Option<Arc<Configuration>>,
}

impl FrameworkConstruction {
    /// Starts a construction with the environment taken from `DNA_ENVIRONMENT`
    pub fn new() -> Self {
        Self::with_environment_value(FrameworkEnvironment::from_env())
    }

    pub fn with_environment_value(environment: FrameworkEnvironment) -> Self {
        let environment = Arc::new(environment);
        let mut services = ServiceCollection::new();
        services.add_instance(environment.clone());
        Self {
            services,
            environment,
            configuration: None,
        }
    }

    /// Replaces the environment; the new registration overrides the old one
    pub fn with_environment(&mut self, environment: FrameworkEnvironment) -> &mut Self {
        self.environment = Arc::new(environment);
        self.services.add_instance(self.environment.clone());
        self
    }

    pub fn environment(&self) -> &FrameworkEnvironment {
        &self.environment
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_deref()
    }

    pub fn services(&self) -> &ServiceCollection {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut ServiceCollection {
        &mut self.services
    }

    pub fn register(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.services.add(descriptor);
        self
    }

    /// Runs `configure` against the registrations
    pub fn configure<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ServiceCollection),
    {
        configure(&mut self.services);
        self
    }

    pub fn add_configuration(&mut self, configuration: Configuration) -> &mut Self {
        let configuration = Arc::new(configuration);
        self.services.add_instance(configuration.clone());
        self.configuration = Some(configuration);
        self
    }

    /// Loads `dna.toml`, `dna.<environment>.toml` and `DNA_` variables from the working directory
    pub fn add_default_configuration(&mut self) -> Result<&mut Self, ConfigError> {
        let dir = std::env::current_dir()
            .map_err(|e| ConfigError::FileRead(".".to_string(), e))?;
        let configuration = ConfigurationBuilder::default_for(dir, &self.environment)?;
        Ok(self.add_configuration(configuration))
    }

    /// Registers the logger factory and the framework's default logger built from it
    pub fn add_logger_factory(&mut self, factory: Arc<dyn LoggerFactory>) -> &mut Self {
        self.services.add_instance::<dyn LoggerFactory>(factory);
        self.services.add(ServiceDescriptor::singleton::<dyn Logger, _>(
            |provider: &ServiceProvider| {
                let factory = provider.resolve::<dyn LoggerFactory>()?;
                Ok(factory.create_logger(DEFAULT_CATEGORY))
            },
        ));
        self
    }

    pub fn add_default_logger(&mut self) -> &mut Self {
        self.add_logger_factory(Arc::new(LogCrateLoggerFactory))
    }

    pub fn add_default_exception_handler(&mut self) -> &mut Self {
        self.services.add(ServiceDescriptor::singleton::<dyn ExceptionHandler, _>(
            |provider: &ServiceProvider| {
                let logger = provider.resolve::<dyn Logger>()?;
                Ok(Arc::new(BaseExceptionHandler::new(logger)) as Arc<dyn ExceptionHandler>)
            },
        ));
        self
    }

    /// Default logger plus default exception handler
    pub fn add_default_services(&mut self) -> &mut Self {
        self.add_default_logger().add_default_exception_handler()
    }

    /// Builds a new provider from the current registrations
    pub fn build(&self) -> ServiceProvider {
        self.services.build()
    }
}

impl Default for FrameworkConstruction {
    fn default() -> Self {
        Self::new()
    }
}
