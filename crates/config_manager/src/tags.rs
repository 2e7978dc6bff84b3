//! Resource tags applied to every declared cloud resource.

use std::collections::BTreeMap;

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;

pub const BUILD_REPOSITORY_NAME: &str = "BUILD_REPOSITORY_NAME";
pub const BUILD_SOURCEBRANCHNAME: &str = "BUILD_SOURCEBRANCHNAME";

const DEFAULT_REPOSITORY_NAME: &str = "local";
const DEFAULT_BRANCH_NAME: &str = "master";

/// Pull-request builds check out a synthetic `merge` branch.
const MERGE_BRANCH_NAME: &str = "merge";

/// A flat, ordered tag set built once from the pipeline environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTags {
    tags: BTreeMap<String, String>,
}

impl ResourceTags {
    pub fn from_env(environment: &str) -> Self {
        Self::from_lookup(environment, |key| std::env::var(key).ok())
    }

    /// Builds the tag set for `environment` using `lookup` for the build
    /// variables. A branch named `merge` is tagged as `master`.
    pub fn from_lookup<F>(environment: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let repository_name =
            lookup(BUILD_REPOSITORY_NAME).unwrap_or_else(|| DEFAULT_REPOSITORY_NAME.to_string());
        let branch_name = match lookup(BUILD_SOURCEBRANCHNAME) {
            Some(branch) if branch == MERGE_BRANCH_NAME => DEFAULT_BRANCH_NAME.to_string(),
            Some(branch) => branch,
            None => DEFAULT_BRANCH_NAME.to_string(),
        };

        let tags = [
            ("DeploymentMethod", "CDK - Python".to_string()),
            ("CICD", "True".to_string()),
            ("RepositoryName", repository_name),
            ("Environment", environment.to_string()),
            ("BranchName", branch_name),
            ("Name", "Network Management Repo".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self { tags }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
