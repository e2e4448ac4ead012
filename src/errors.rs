use thiserror::Error;

use crate::container::ContainerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Failed to bind configuration section '{0}': {1}")]
    Bind(String, #[source] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum FrameworkError {
    /// An accessor was used before `build`
    #[error("Framework has not been built yet; call build() during startup before using it")]
    NotBuilt,
    #[error("Framework has already been built; the service provider cannot be replaced")]
    AlreadyBuilt,
    /// A named service the framework relies on was never registered
    #[error("Required service '{0}' is not registered")]
    MissingService(&'static str),
    #[error(transparent)]
    Container(ContainerError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ContainerError> for FrameworkError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::ServiceNotRegistered { type_name } => {
                FrameworkError::MissingService(type_name)
            }
            other => FrameworkError::Container(other),
        }
    }
}
