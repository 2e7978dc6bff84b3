//! Configuration management for Pipeline Roller
//!
//! Every value a command needs from its surroundings is captured here once, at
//! process start, and then handed to the components that use it:
//!
//! - [`EnvironmentConfig`]: the per-environment JSON file (`config/{env}.json`)
//! - [`PullRequestContext`]: the pull request a pipeline run reports to
//! - [`ResourceTags`]: tags applied to every declared cloud resource
//! - [`ProvisioningSettings`]: the organization and projects new repositories
//!   are provisioned in

pub mod environment_config;
pub mod errors;
pub mod provisioning_settings;
pub mod pull_request_context;
pub mod tags;

// Re-export for convenient access
pub use environment_config::{EnvironmentConfig, DEFAULT_CONFIG_DIR};
pub use errors::{ConfigurationError, ConfigurationResult};
pub use provisioning_settings::ProvisioningSettings;
pub use pull_request_context::PullRequestContext;
pub use tags::ResourceTags;
