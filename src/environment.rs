//! Framework environment descriptor

use std::fmt;

/// Environment variable that overrides the detected environment name
pub const ENVIRONMENT_VARIABLE: &str = "DNA_ENVIRONMENT";

pub const DEVELOPMENT: &str = "Development";
pub const PRODUCTION: &str = "Production";

/// Details about the environment the framework runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkEnvironment {
    name: String,
}

impl FrameworkEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Reads `DNA_ENVIRONMENT`, falling back to the build profile
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENVIRONMENT_VARIABLE).ok())
    }

    fn from_value(value: Option<String>) -> Self {
        match value {
            Some(name) if !name.trim().is_empty() => Self::new(name.trim()),
            _ => Self::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_development(&self) -> bool {
        self.name.eq_ignore_ascii_case(DEVELOPMENT)
    }

    pub fn is_production(&self) -> bool {
        self.name.eq_ignore_ascii_case(PRODUCTION)
    }
}

impl Default for FrameworkEnvironment {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::new(DEVELOPMENT)
        } else {
            Self::new(PRODUCTION)
        }
    }
}

impl fmt::Display for FrameworkEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_follows_build_profile() {
        let env = FrameworkEnvironment::default();
        assert_eq!(env.is_development(), cfg!(debug_assertions));
        assert_eq!(env.is_production(), !cfg!(debug_assertions));
    }

    #[test]
    fn test_explicit_value_wins() {
        let env = FrameworkEnvironment::from_value(Some(" staging ".to_string()));
        assert_eq!(env.name(), "staging");
        assert!(!env.is_development());
        assert!(!env.is_production());
    }

    #[test]
    fn test_blank_value_falls_back() {
        assert_eq!(
            FrameworkEnvironment::from_value(Some("   ".to_string())),
            FrameworkEnvironment::default()
        );
        assert_eq!(FrameworkEnvironment::from_value(None), FrameworkEnvironment::default());
    }

    #[test]
    fn test_name_comparison_ignores_case() {
        assert!(FrameworkEnvironment::new("production").is_production());
        assert_eq!(FrameworkEnvironment::new("production").to_string(), "production");
    }
}
