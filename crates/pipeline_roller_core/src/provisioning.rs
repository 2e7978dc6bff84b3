//! Provisioning a new Azure DevOps repository for a copy of the sample
//! project.
//!
//! The workflow runs four steps in order:
//!
//! 1. create the repository, or find it when the name is already taken
//! 2. create the development, pull-request and release pipelines
//! 3. point the local `origin` at the new repository and push every branch
//! 4. protect the default branch with a build-validation policy
//!
//! Steps report success as booleans and log their failures. Nothing is retried
//! and nothing is rolled back.

use config_manager::ProvisioningSettings;
use devops_client::{
    CreateOutcome, OrganizationEndpoint, PipelineCreatePayload, PipelineId,
    PolicyConfigurationPayload, ProvisioningClient, RepositoryCreatePayload, RepositoryId,
};
use tracing::{error, info, instrument, warn};

use crate::git::GitRemote;
use crate::pipeline_stage::PipelineStage;
use crate::repository_name::RepositoryName;

#[cfg(test)]
#[path = "provisioning_tests.rs"]
mod tests;

/// What a full provisioning run achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub repository_ready: bool,
    pub pipelines: Vec<(PipelineStage, bool)>,
    pub history_migrated: bool,
    pub policy_created: bool,
}

impl ProvisioningReport {
    pub fn is_complete(&self) -> bool {
        self.repository_ready
            && self.pipelines.len() == PipelineStage::ALL.len()
            && self.pipelines.iter().all(|(_, created)| *created)
            && self.history_migrated
            && self.policy_created
    }
}

/// One provisioning session for a single repository name.
///
/// The repository id and the pull-request pipeline id are filled in as the
/// corresponding steps succeed; later steps refuse to run without them.
pub struct RepositoryProvisioner<C, G> {
    client: C,
    git: G,
    settings: ProvisioningSettings,
    endpoint: OrganizationEndpoint,
    repository_name: RepositoryName,
    repository_id: Option<RepositoryId>,
    pull_request_pipeline_id: Option<PipelineId>,
}

impl<C: ProvisioningClient, G: GitRemote> RepositoryProvisioner<C, G> {
    pub fn new(
        client: C,
        git: G,
        settings: ProvisioningSettings,
        repository_name: RepositoryName,
    ) -> Self {
        let endpoint = settings.endpoint();
        Self {
            client,
            git,
            settings,
            endpoint,
            repository_name,
            repository_id: None,
            pull_request_pipeline_id: None,
        }
    }

    pub fn repository_name(&self) -> &RepositoryName {
        &self.repository_name
    }

    pub fn repository_id(&self) -> Option<&RepositoryId> {
        self.repository_id.as_ref()
    }

    pub fn pull_request_pipeline_id(&self) -> Option<PipelineId> {
        self.pull_request_pipeline_id
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs every step. Stops after the first step if no repository id could
    /// be obtained.
    pub async fn run(&mut self) -> ProvisioningReport {
        let mut report = ProvisioningReport {
            repository_ready: self.create_repository().await,
            ..ProvisioningReport::default()
        };

        if !report.repository_ready {
            error!(
                repository = %self.repository_name,
                "Failed to create or find repository. Aborting."
            );
            return report;
        }

        report.pipelines = self.create_pipelines().await;
        report.history_migrated = self.migrate_history();
        report.policy_created = self.create_branch_policy().await;

        info!(
            repository = %self.repository_name,
            complete = report.is_complete(),
            "Repository provisioning finished"
        );
        report
    }

    /// Creates the repository in the parent project, or looks it up by name
    /// when it already exists. Returns whether a repository id is now known.
    #[instrument(skip(self), fields(repository = %self.repository_name))]
    pub async fn create_repository(&mut self) -> bool {
        info!("Creating Azure DevOps repository");
        let payload = RepositoryCreatePayload::new(
            self.repository_name.as_str(),
            self.settings.parent_project_id.as_str(),
        );

        match self.client.create_repository(&self.endpoint, &payload).await {
            Ok(CreateOutcome::Created(id)) => {
                info!(repository_id = %id, "Repository created");
                self.repository_id = Some(id);
                true
            }
            Ok(CreateOutcome::AlreadyExists) => {
                info!("Repository already exists, retrieving its id");
                self.find_existing_repository().await
            }
            Ok(CreateOutcome::Failed(status)) => {
                error!(status = status, "Failed to create repository");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to create repository");
                false
            }
        }
    }

    async fn find_existing_repository(&mut self) -> bool {
        match self
            .client
            .get_repository(
                &self.endpoint,
                &self.settings.parent_project_id,
                self.repository_name.as_str(),
            )
            .await
        {
            Ok(repository) => {
                info!(repository_id = %repository.id, "Found existing repository");
                self.repository_id = Some(repository.id);
                true
            }
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Failed to retrieve existing repository");
                false
            }
        }
    }

    /// Creates one pipeline per stage. Requires the repository id; without it
    /// no request is made and the result is empty.
    ///
    /// The pull-request pipeline id is taken from the create response or,
    /// failing that, searched for among the source project's pipelines.
    #[instrument(skip(self), fields(repository = %self.repository_name))]
    pub async fn create_pipelines(&mut self) -> Vec<(PipelineStage, bool)> {
        let Some(repository_id) = self.repository_id.clone() else {
            error!("Repository id not set. Create the repository first.");
            return Vec::new();
        };

        let name = self.repository_name.as_str().to_string();
        let mut results = Vec::with_capacity(PipelineStage::ALL.len());

        for stage in PipelineStage::ALL {
            let payload = PipelineCreatePayload::yaml(
                stage.pipeline_name(&name),
                stage.yaml_path(),
                &repository_id,
                name.as_str(),
                PipelineStage::folder(&name),
            );

            let outcome = self
                .client
                .create_pipeline(&self.endpoint, &self.settings.parent_project_id, &payload)
                .await;

            let created = match &outcome {
                Ok(CreateOutcome::Created(id)) => {
                    info!(stage = %stage, pipeline_id = %id, "Pipeline created");
                    true
                }
                Ok(CreateOutcome::AlreadyExists) => {
                    warn!(stage = %stage, "Pipeline already exists");
                    false
                }
                Ok(CreateOutcome::Failed(status)) => {
                    error!(stage = %stage, status = status, "Pipeline creation failed");
                    false
                }
                Err(e) => {
                    error!(stage = %stage, error = %e, "Pipeline creation failed");
                    false
                }
            };

            if stage == PipelineStage::PullRequest {
                match outcome {
                    Ok(CreateOutcome::Created(id)) => self.pull_request_pipeline_id = Some(id),
                    _ => self.find_pull_request_pipeline().await,
                }
            }

            results.push((stage, created));
        }

        results
    }

    /// Takes the first pipeline of the source project whose name contains both
    /// the repository name and `pull-request`.
    ///
    /// Substring matching can pick another repository's pipeline when one
    /// repository name contains another; the first match wins.
    async fn find_pull_request_pipeline(&mut self) {
        warn!(
            pipeline = %PipelineStage::PullRequest.pipeline_name(self.repository_name.as_str()),
            "Pull-request pipeline id not returned, searching for it"
        );

        let pipelines = match self
            .client
            .list_pipelines(&self.endpoint, &self.settings.source_project_name)
            .await
        {
            Ok(pipelines) => pipelines,
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Failed to retrieve pipelines");
                return;
            }
        };

        let stage_name = PipelineStage::PullRequest.as_str();
        let repository_name = self.repository_name.as_str();
        let found = pipelines
            .into_iter()
            .find(|p| p.name.contains(repository_name) && p.name.contains(stage_name));

        match found {
            Some(pipeline) => {
                info!(pipeline = %pipeline.name, pipeline_id = %pipeline.id, "Found pull-request pipeline");
                self.pull_request_pipeline_id = Some(pipeline.id);
            }
            None => error!("No pull-request pipeline found for the repository"),
        }
    }

    /// Points the configured remote at the new repository and pushes every
    /// branch to it.
    #[instrument(skip(self), fields(repository = %self.repository_name))]
    pub fn migrate_history(&self) -> bool {
        let url = self.settings.ssh_remote_url(self.repository_name.as_str());
        let remote = self.settings.remote_name.as_str();
        info!(remote = remote, url = %url, "Starting git migration");

        let result = self
            .git
            .set_remote_url(remote, &url)
            .and_then(|_| self.git.push_all(remote));

        match result {
            Ok(()) => {
                info!("Git migration completed");
                true
            }
            Err(e) => {
                error!(error = %e, "Git migration failed");
                false
            }
        }
    }

    /// Installs the blocking build-validation policy on the protected branch.
    /// Requires both the repository id and the pull-request pipeline id.
    #[instrument(skip(self), fields(repository = %self.repository_name))]
    pub async fn create_branch_policy(&self) -> bool {
        let (Some(repository_id), Some(pipeline_id)) =
            (self.repository_id.as_ref(), self.pull_request_pipeline_id)
        else {
            error!(
                has_repository_id = self.repository_id.is_some(),
                has_pipeline_id = self.pull_request_pipeline_id.is_some(),
                "Missing required ids for policy creation"
            );
            return false;
        };

        info!(branch = %self.settings.protected_branch, "Setting build validation policy");
        let payload = PolicyConfigurationPayload::build_validation(
            pipeline_id,
            repository_id,
            &self.settings.protected_branch,
        );

        match self
            .client
            .create_policy_configuration(&self.endpoint, &self.settings.source_project_name, &payload)
            .await
        {
            Ok(()) => {
                info!("Build validation policy created");
                true
            }
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Failed to create build validation policy");
                false
            }
        }
    }
}
