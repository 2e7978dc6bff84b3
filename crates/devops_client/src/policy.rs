//! Branch policy configuration payloads.

use serde::Serialize;

use crate::models::{PipelineId, RepositoryId};

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

/// Policy type id of the built-in "Build" (build validation) policy.
pub const BUILD_VALIDATION_POLICY_TYPE_ID: &str = "0609b952-1397-4640-95ec-e00a01b2c241";

/// Hours a successful validation build stays valid.
const BUILD_VALIDITY_HOURS: f64 = 720.0;

#[derive(Clone, Debug, Serialize)]
pub struct PolicyTypeReference {
    pub id: String,
}

/// The branch a policy applies to.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyScope {
    pub repository_id: RepositoryId,
    pub ref_name: String,
    pub match_kind: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildValidationSettings {
    pub build_definition_id: PipelineId,
    pub manual_queue_only: bool,
    pub queue_on_source_update_only: bool,
    pub scope: Vec<PolicyScope>,
    pub valid_duration: f64,
}

/// Payload for creating a policy configuration.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfigurationPayload {
    pub is_enabled: bool,
    pub is_blocking: bool,
    pub is_deleted: bool,
    pub is_enterprise_managed: bool,
    #[serde(rename = "type")]
    pub policy_type: PolicyTypeReference,
    pub settings: BuildValidationSettings,
}

impl PolicyConfigurationPayload {
    /// A blocking build-validation policy on exactly `refs/heads/{branch}` of the
    /// repository, queued automatically whenever the source branch changes.
    pub fn build_validation(
        pipeline_id: PipelineId,
        repository_id: &RepositoryId,
        branch: &str,
    ) -> Self {
        Self {
            is_enabled: true,
            is_blocking: true,
            is_deleted: false,
            is_enterprise_managed: false,
            policy_type: PolicyTypeReference {
                id: BUILD_VALIDATION_POLICY_TYPE_ID.to_string(),
            },
            settings: BuildValidationSettings {
                build_definition_id: pipeline_id,
                manual_queue_only: false,
                queue_on_source_update_only: true,
                scope: vec![PolicyScope {
                    repository_id: repository_id.clone(),
                    ref_name: format!("refs/heads/{}", branch),
                    match_kind: "exact".to_string(),
                }],
                valid_duration: BUILD_VALIDITY_HOURS,
            },
        }
    }
}
