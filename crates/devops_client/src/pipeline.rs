//! Pipeline creation payloads.

use serde::Serialize;

use crate::models::RepositoryId;

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// Repository kind for pipelines backed by Azure Repos.
const AZURE_REPOS_GIT: &str = "azureReposGit";

/// Configuration kind for YAML pipelines.
const YAML_CONFIGURATION: &str = "yaml";

/// The repository a pipeline definition lives in.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineRepository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Where a pipeline finds its definition.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineConfiguration {
    pub path: String,
    pub repository: PipelineRepository,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Payload for creating a pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineCreatePayload {
    pub name: String,
    pub configuration: PipelineConfiguration,
    pub folder: String,
}

impl PipelineCreatePayload {
    /// A YAML pipeline whose definition is read from `path` in an Azure Repos
    /// repository.
    pub fn yaml(
        name: impl Into<String>,
        path: impl Into<String>,
        repository_id: &RepositoryId,
        repository_name: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            configuration: PipelineConfiguration {
                path: path.into(),
                repository: PipelineRepository {
                    id: repository_id.clone(),
                    name: repository_name.into(),
                    kind: AZURE_REPOS_GIT.to_string(),
                },
                kind: YAML_CONFIGURATION.to_string(),
            },
            folder: folder.into(),
        }
    }
}
