//! Configuration management for the Pipeline Roller CLI.
//!
//! The optional `pipeline-roller.toml` in the current directory describes
//! where repositories are provisioned. Per-environment deployment values live
//! in `config/{environment}.json` and are handled by `config_manager`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use config_manager::ProvisioningSettings;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "pipeline-roller.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the Pipeline Roller CLI application.
///
/// # Example TOML Configuration
///
/// ```toml
/// [provisioning]
/// organization = "mrh-trowe"
/// parent_project_id = "26546064-040a-41ae-949a-c8f35fa94a9b"
/// source_project_name = "cdk-projects"
/// protected_branch = "master"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Target organization, projects and endpoints for `setup-repo`.
    #[serde(default)]
    pub provisioning: ProvisioningSettings,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read or
    /// does not contain valid configuration TOML.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the built-in
    /// defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            info!("No configuration file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Resolves the path to the configuration file.
///
/// An explicit path is used as given; otherwise `pipeline-roller.toml` in the
/// current directory.
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
