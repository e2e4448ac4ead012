//! Application bootstrap: register services on a [`FrameworkConstruction`],
//! build it once into a [`ServiceProvider`], then reach configuration,
//! logging, environment and error handling through the [`Framework`] context.

pub mod configuration;
pub mod construction;
pub mod container;
pub mod environment;
pub mod errors;
pub mod exceptions;
pub mod framework;
pub mod logging;

// Re-export commonly used items for convenience
pub use configuration::{Configuration, ConfigurationBuilder};
pub use construction::FrameworkConstruction;
pub use container::{
    ContainerError, ServiceCollection, ServiceDescriptor, ServiceLifetime, ServiceProvider,
};
pub use environment::FrameworkEnvironment;
pub use errors::{ConfigError, FrameworkError};
pub use exceptions::{BaseExceptionHandler, ExceptionHandler};
pub use framework::{Framework, FrameworkContext};
pub use logging::{LogLevel, Logger, LoggerFactory};
