//! Fixed identity and endpoint settings for repository provisioning.

use devops_client::{OrganizationEndpoint, DEFAULT_API_BASE_URL, PROVISIONING_API_VERSION};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "provisioning_settings_tests.rs"]
mod tests;

pub const DEFAULT_SSH_REMOTE_HOST: &str = "git@ssh.dev.azure.com:v3";
pub const DEFAULT_PROTECTED_BRANCH: &str = "master";
pub const DEFAULT_REMOTE_NAME: &str = "origin";

/// Where new repositories are created and how local history is pushed there.
///
/// Read from the `[provisioning]` table of the application config. The
/// organization and project identity have no defaults and must be supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningSettings {
    pub api_base_url: String,
    pub api_version: String,
    pub organization: String,
    /// Id of the project the repositories are created in.
    pub parent_project_id: String,
    /// Name of the project pipelines and remotes are addressed through.
    pub source_project_name: String,
    pub ssh_remote_host: String,
    pub protected_branch: String,
    pub remote_name: String,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: PROVISIONING_API_VERSION.to_string(),
            organization: String::new(),
            parent_project_id: String::new(),
            source_project_name: String::new(),
            ssh_remote_host: DEFAULT_SSH_REMOTE_HOST.to_string(),
            protected_branch: DEFAULT_PROTECTED_BRANCH.to_string(),
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
        }
    }
}

impl ProvisioningSettings {
    pub fn endpoint(&self) -> OrganizationEndpoint {
        OrganizationEndpoint::new(
            self.api_base_url.as_str(),
            self.organization.as_str(),
            self.api_version.as_str(),
        )
    }

    /// SSH remote of `repository_name`, e.g.
    /// `git@ssh.dev.azure.com:v3/{org}/{project}/{repo}`.
    pub fn ssh_remote_url(&self, repository_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.ssh_remote_host.trim_end_matches('/'),
            self.organization,
            self.source_project_name,
            repository_name
        )
    }

    /// Checks that every setting the provisioner needs is present.
    pub fn validate(&self) -> ConfigurationResult<()> {
        let required = [
            ("provisioning.api_base_url", &self.api_base_url),
            ("provisioning.api_version", &self.api_version),
            ("provisioning.organization", &self.organization),
            ("provisioning.parent_project_id", &self.parent_project_id),
            ("provisioning.source_project_name", &self.source_project_name),
            ("provisioning.ssh_remote_host", &self.ssh_remote_host),
            ("provisioning.protected_branch", &self.protected_branch),
            ("provisioning.remote_name", &self.remote_name),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigurationError::RequiredConfigMissing {
                    key: key.to_string(),
                });
            }
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "provisioning.api_base_url".to_string(),
                reason: "must be an http or https URL".to_string(),
            });
        }

        Ok(())
    }
}
