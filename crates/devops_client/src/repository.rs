//! Organization endpoint and repository payload types.

use serde::Serialize;
use url::Url;

use crate::Error;

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// Base URL of the hosted Azure DevOps service.
pub const DEFAULT_API_BASE_URL: &str = "https://dev.azure.com";

/// API version used by the provisioning endpoints.
pub const PROVISIONING_API_VERSION: &str = "7.0";

/// An Azure DevOps organization together with the API version to call it with.
///
/// All provisioning URLs are built from this value, which keeps the host
/// replaceable in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrganizationEndpoint {
    base_url: String,
    organization: String,
    api_version: String,
}

impl OrganizationEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            organization: organization.into(),
            api_version: api_version.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build `{base}/{organization}/{segments...}?api-version={version}`.
    ///
    /// # Errors
    /// Returns `Error::InvalidUrl` if the base URL cannot be parsed.
    pub fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                Error::InvalidUrl(format!("{}: base URL cannot be a base", self.base_url))
            })?;
            path.pop_if_empty().push(&self.organization).extend(segments);
        }

        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

/// Reference to a project by id.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectReference {
    pub id: String,
}

/// Payload for creating a new git repository.
#[derive(Clone, Debug, Serialize)]
pub struct RepositoryCreatePayload {
    pub name: String,
    pub project: ProjectReference,
}

impl RepositoryCreatePayload {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: ProjectReference {
                id: project_id.into(),
            },
        }
    }
}
