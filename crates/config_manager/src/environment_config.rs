//! Per-environment configuration files.
//!
//! Each deployment environment has a flat JSON object in
//! `config/{environment}.json`, for example:
//!
//! ```json
//! { "AccountId": "123456789012", "AWSRegion": "eu-central-1" }
//! ```

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "environment_config_tests.rs"]
mod tests;

/// Directory the environment files are read from, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Configuration values for a single deployment environment.
///
/// Loaded once and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    environment: String,
    data: Map<String, Value>,
}

impl EnvironmentConfig {
    /// Loads `{config_dir}/{environment}.json`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::FileNotFound` if the file does not exist
    /// - `ConfigurationError::FileAccessError` if it cannot be read
    /// - `ConfigurationError::ParseError` if it is not a JSON object
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use config_manager::EnvironmentConfig;
    ///
    /// let config = EnvironmentConfig::load(Path::new("config"), "dev").unwrap();
    /// let region = config.get_or("AWSRegion", "eu-central-1");
    /// ```
    pub fn load(config_dir: &Path, environment: &str) -> ConfigurationResult<Self> {
        let path = config_dir.join(format!("{}.json", environment));
        debug!("Loading environment configuration from {:?}", path);

        let content = std::fs::read_to_string(&path).map_err(|e| {
            error!(
                environment = environment,
                "Failed to load config file {:?}: {}", path, e
            );
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigurationError::FileAccessError {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let config = Self::from_json(environment, &content).inspect_err(|e| {
            error!(
                environment = environment,
                "Failed to load config file {:?}: {}", path, e
            );
        })?;

        info!(
            environment = environment,
            key_count = config.data.len(),
            "Loaded environment configuration"
        );
        Ok(config)
    }

    /// Parses configuration values from JSON text.
    ///
    /// # Errors
    /// Returns `ConfigurationError::ParseError` if the text is not valid JSON or
    /// its top level is not an object.
    pub fn from_json(environment: &str, content: &str) -> ConfigurationResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ConfigurationError::ParseError {
                reason: e.to_string(),
            })?;

        match value {
            Value::Object(data) => Ok(Self {
                environment: environment.to_string(),
                data,
            }),
            other => Err(ConfigurationError::ParseError {
                reason: format!(
                    "expected a JSON object at the top level, found {}",
                    json_type_name(&other)
                ),
            }),
        }
    }

    /// Name of the environment the values belong to.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Looks up a value. A missing key is logged but is not an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let value = self.data.get(key);
        if value.is_none() {
            error!(
                "Key '{}' not found in configuration for environment '{}'",
                key, self.environment
            );
            debug!("Available keys: {:?}", self.keys().collect::<Vec<_>>());
        }
        value
    }

    /// Looks up a value, falling back to `default` when the key is missing.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Looks up a value as text. Numbers and booleans are rendered as text too,
    /// since account ids are often written as numbers.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
