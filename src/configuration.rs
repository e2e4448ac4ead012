//! Key/value application configuration
//!
//! Values live in a single TOML table. Keys are `:`-separated paths, so
//! `logging:level` addresses `level` inside the `[logging]` table.
//! Sources are layered in the order they are added; later sources win.

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use toml::{Table, Value};

use crate::environment::FrameworkEnvironment;
use crate::errors::ConfigError;

// Configuration location
const CONFIG_FILE_STEM: &str = "dna";
const CONFIG_FILE_EXTENSION: &str = "toml";
pub const ENV_PREFIX: &str = "DNA_";

const KEY_SEPARATOR: char = ':';
const ENV_KEY_SEPARATOR: &str = "__";

/// Read-only configuration object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    root: Table,
}

impl Configuration {
    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Accepts TOML booleans as well as string values from environment variables
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn section(&self, key: &str) -> Option<Configuration> {
        self.get(key)?.as_table().cloned().map(Configuration::from_table)
    }

    /// Deserializes a section into `T`; a missing section binds from an empty table
    pub fn bind<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Table(Table::new()));
        value
            .try_into()
            .map_err(|e| ConfigError::Bind(key.to_string(), e))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// Layers configuration sources into a [`Configuration`]
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    root: Table,
}

impl ConfigurationBuilder {
    pub fn add_toml_str(self, source: &str) -> Result<Self, ConfigError> {
        self.add_named_toml("<inline>", source)
    }

    /// Adds a TOML file; with `optional` a missing file is skipped
    pub fn add_toml_file(self, path: impl AsRef<Path>, optional: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(content) => self.add_named_toml(&display, &content),
            Err(e) if optional && e.kind() == ErrorKind::NotFound => {
                log::debug!("Optional configuration file '{}' not found", display);
                Ok(self)
            }
            Err(e) => Err(ConfigError::FileRead(display, e)),
        }
    }

    /// Adds process environment variables starting with `prefix`
    pub fn add_environment_variables(self, prefix: &str) -> Self {
        self.add_variables(prefix, std::env::vars())
    }

    /// `PREFIX_LOGGING__LEVEL=debug` becomes `logging:level = "debug"`
    pub fn add_variables<I>(mut self, prefix: &str, variables: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in variables {
            let Some(stripped) = name.strip_prefix(prefix) else {
                continue;
            };
            let path: Vec<String> = stripped
                .split(ENV_KEY_SEPARATOR)
                .map(|segment| segment.to_lowercase())
                .collect();
            if path.iter().any(|segment| segment.is_empty()) {
                continue;
            }
            insert_path(&mut self.root, &path, value);
        }
        self
    }

    pub fn build(self) -> Configuration {
        Configuration::from_table(self.root)
    }

    /// `dna.toml`, then `dna.<environment>.toml` from `dir`, then `DNA_` variables
    pub fn default_for(
        dir: impl AsRef<Path>,
        environment: &FrameworkEnvironment,
    ) -> Result<Configuration, ConfigError> {
        let dir = dir.as_ref();
        let base = dir.join(format!("{}.{}", CONFIG_FILE_STEM, CONFIG_FILE_EXTENSION));
        let per_env = dir.join(format!(
            "{}.{}.{}",
            CONFIG_FILE_STEM,
            environment.name().to_lowercase(),
            CONFIG_FILE_EXTENSION
        ));

        Ok(ConfigurationBuilder::default()
            .add_toml_file(base, true)?
            .add_toml_file(per_env, true)?
            .add_environment_variables(ENV_PREFIX)
            .build())
    }

    fn add_named_toml(mut self, name: &str, source: &str) -> Result<Self, ConfigError> {
        let table: Table = source
            .parse()
            .map_err(|e| ConfigError::TomlParse(name.to_string(), e))?;
        merge_tables(&mut self.root, table);
        Ok(self)
    }
}

fn merge_tables(target: &mut Table, source: Table) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn insert_path(root: &mut Table, path: &[String], value: String) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert(Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        match entry {
            Value::Table(table) => current = table,
            _ => return,
        }
    }
    current.insert(last.clone(), Value::String(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
        name = "sample"

        [logging]
        level = "warn"
        colors = true

        [server]
        port = 8080
        hosts = ["a", "b"]
    "#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ServerOptions {
        port: u16,
        #[serde(default)]
        hosts: Vec<String>,
    }

    fn sample() -> Configuration {
        ConfigurationBuilder::default()
            .add_toml_str(SAMPLE)
            .unwrap()
            .build()
    }

    #[test]
    fn test_get_nested_keys() {
        let config = sample();
        assert_eq!(config.get_str("name"), Some("sample"));
        assert_eq!(config.get_str("logging:level"), Some("warn"));
        assert_eq!(config.get_bool("logging:colors"), Some(true));
        assert_eq!(config.get_i64("server:port"), Some(8080));
        assert!(config.get("logging:missing").is_none());
        assert!(config.get("name:nested").is_none());
    }

    #[test]
    fn test_bind_section() {
        let config = sample();
        let server: ServerOptions = config.bind("server").unwrap();
        assert_eq!(server, ServerOptions { port: 8080, hosts: vec!["a".into(), "b".into()] });
    }

    #[test]
    fn test_bind_reports_type_errors() {
        let config = sample();
        let result: Result<ServerOptions, _> = config.bind("logging");
        assert!(matches!(result, Err(ConfigError::Bind(key, _)) if key == "logging"));
    }

    #[test]
    fn test_later_sources_override_and_merge() {
        let config = ConfigurationBuilder::default()
            .add_toml_str(SAMPLE)
            .unwrap()
            .add_toml_str("[logging]\nlevel = \"debug\"")
            .unwrap()
            .build();

        assert_eq!(config.get_str("logging:level"), Some("debug"));
        assert_eq!(config.get_bool("logging:colors"), Some(true));
    }

    #[test]
    fn test_environment_variables_override_files() {
        let vars = vec![
            ("DNA_LOGGING__LEVEL".to_string(), "trace".to_string()),
            ("DNA_SERVER__PORT".to_string(), "9090".to_string()),
            ("DNA_NAME__INNER".to_string(), "x".to_string()),
            ("OTHER_VALUE".to_string(), "ignored".to_string()),
            ("DNA_BROKEN____KEY".to_string(), "ignored".to_string()),
        ];
        let config = ConfigurationBuilder::default()
            .add_toml_str(SAMPLE)
            .unwrap()
            .add_variables(ENV_PREFIX, vars)
            .build();

        assert_eq!(config.get_str("logging:level"), Some("trace"));
        assert_eq!(config.get_i64("server:port"), Some(9090));
        assert_eq!(config.get_str("name:inner"), Some("x"));
        assert!(config.get("other_value").is_none());
        assert!(config.get("broken").is_none());
    }

    #[test]
    fn test_section() {
        let logging = sample().section("logging").unwrap();
        assert_eq!(logging.get_str("level"), Some("warn"));
        assert!(sample().section("name").is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let result = ConfigurationBuilder::default().add_toml_str("= nope");
        assert!(matches!(result, Err(ConfigError::TomlParse(_, _))));
    }

    #[test]
    fn test_optional_and_required_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        assert!(ConfigurationBuilder::default()
            .add_toml_file(&missing, true)
            .is_ok());
        assert!(matches!(
            ConfigurationBuilder::default().add_toml_file(&missing, false),
            Err(ConfigError::FileRead(_, _))
        ));
    }

    #[test]
    fn test_default_for_layers_environment_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dna.toml"), SAMPLE).unwrap();
        fs::write(
            dir.path().join("dna.staging.toml"),
            "[server]\nport = 1234\n",
        )
        .unwrap();

        let staging = FrameworkEnvironment::new("Staging");
        let config = ConfigurationBuilder::default_for(dir.path(), &staging).unwrap();
        assert_eq!(config.get_i64("server:port"), Some(1234));
        assert_eq!(config.get_str("name"), Some("sample"));

        let other = FrameworkEnvironment::new("Production");
        let config = ConfigurationBuilder::default_for(dir.path(), &other).unwrap();
        assert_eq!(config.get_i64("server:port"), Some(8080));
    }
}
