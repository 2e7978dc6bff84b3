//! The three pipelines every provisioned repository receives.

use std::fmt;

#[cfg(test)]
#[path = "pipeline_stage_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Development,
    PullRequest,
    Release,
}

impl PipelineStage {
    /// Stages in the order they are created.
    pub const ALL: [PipelineStage; 3] = [
        PipelineStage::Development,
        PipelineStage::PullRequest,
        PipelineStage::Release,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Development => "development",
            PipelineStage::PullRequest => "pull-request",
            PipelineStage::Release => "release",
        }
    }

    /// Repository path of the stage's YAML definition.
    pub fn yaml_path(&self) -> String {
        match self {
            PipelineStage::Development => "/azure-pipelines.yml".to_string(),
            stage => format!("/azure-pipelines-{}.yml", stage.as_str()),
        }
    }

    pub fn pipeline_name(&self, repository_name: &str) -> String {
        format!("{}-{}", repository_name, self.as_str())
    }

    /// Pipelines of one repository share a folder named after it.
    pub fn folder(repository_name: &str) -> String {
        format!("\\{}", repository_name)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
