//! Pull-request context of a running pipeline.
//!
//! Azure Pipelines exposes the pull request being validated through predefined
//! variables. They are read once into a [`PullRequestContext`].

use auth_handler::Credential;
use devops_client::PullRequestTarget;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "pull_request_context_tests.rs"]
mod tests;

pub const SYSTEM_ACCESSTOKEN: &str = "SYSTEM_ACCESSTOKEN";
pub const SYSTEM_COLLECTIONURI: &str = "SYSTEM_COLLECTIONURI";
pub const SYSTEM_PULLREQUEST_PULLREQUESTID: &str = "SYSTEM_PULLREQUEST_PULLREQUESTID";
pub const SYSTEM_TEAMPROJECT: &str = "SYSTEM_TEAMPROJECT";
pub const BUILD_REPOSITORY_ID: &str = "BUILD_REPOSITORY_ID";
pub const BUILD_SOURCEVERSION: &str = "BUILD_SOURCEVERSION";

/// Number of commit characters used to name uploaded attachments.
const COMMIT_PREFIX_LENGTH: usize = 5;

/// The pull request a pipeline run reports to, plus the token to do so.
#[derive(Debug)]
pub struct PullRequestContext {
    collection_uri: String,
    team_project: String,
    repository_id: String,
    pull_request_id: String,
    access_token: SecretString,
    source_version: String,
}

impl PullRequestContext {
    /// Reads the context from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigurationError::RequiredConfigMissing` naming the first
    /// required variable that is unset or empty.
    pub fn from_env() -> ConfigurationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the context through an arbitrary variable lookup.
    ///
    /// `BUILD_SOURCEVERSION` is optional; every other variable is required.
    pub fn from_lookup<F>(lookup: F) -> ConfigurationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> ConfigurationResult<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => {
                    error!(variable = key, "Required pipeline variable is not set");
                    Err(ConfigurationError::RequiredConfigMissing {
                        key: key.to_string(),
                    })
                }
            }
        };

        let context = Self {
            collection_uri: required(SYSTEM_COLLECTIONURI)?,
            team_project: required(SYSTEM_TEAMPROJECT)?,
            repository_id: required(BUILD_REPOSITORY_ID)?,
            pull_request_id: required(SYSTEM_PULLREQUEST_PULLREQUESTID)?,
            access_token: SecretString::from(required(SYSTEM_ACCESSTOKEN)?),
            source_version: lookup(BUILD_SOURCEVERSION).unwrap_or_default(),
        };

        debug!(
            collection_uri = %context.collection_uri,
            team_project = %context.team_project,
            pull_request_id = %context.pull_request_id,
            "Loaded pull request context"
        );
        Ok(context)
    }

    pub fn collection_uri(&self) -> &str {
        &self.collection_uri
    }

    pub fn team_project(&self) -> &str {
        &self.team_project
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    /// The first five characters of the source commit, or an empty string.
    pub fn commit_sha_prefix(&self) -> String {
        self.source_version
            .chars()
            .take(COMMIT_PREFIX_LENGTH)
            .collect()
    }

    /// The pull request as an API target.
    pub fn target(&self) -> PullRequestTarget {
        PullRequestTarget::new(
            self.collection_uri.as_str(),
            self.team_project.as_str(),
            self.repository_id.as_str(),
            self.pull_request_id.as_str(),
        )
    }

    /// A bearer credential built from the pipeline access token.
    ///
    /// # Errors
    /// Returns `ConfigurationError::InvalidConfiguration` if the token cannot be
    /// used as a credential.
    pub fn credential(&self) -> ConfigurationResult<Credential> {
        Credential::bearer(self.access_token.expose_secret()).map_err(|e| {
            ConfigurationError::InvalidConfiguration {
                field: SYSTEM_ACCESSTOKEN.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
