//! Repository provisioning command.

use std::path::PathBuf;

use auth_handler::Credential;
use clap::Args;
use devops_client::AzureDevOpsClient;
use pipeline_roller_core::{
    GitCommandLine, ProvisioningReport, RepositoryName, RepositoryProvisioner,
};
use tracing::{error, info};

use crate::{config::AppConfig, errors::Error};

#[cfg(test)]
#[path = "setup_repo_cmd_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct SetupRepoArgs {
    /// Personal access token used for every provisioning request.
    #[arg(long = "azure-access-token", visible_alias = "pat")]
    pub azure_access_token: String,

    /// Name of the repository to create.
    #[arg(long = "repository-name", visible_alias = "rn")]
    pub repository_name: String,

    /// Working copy whose history is pushed to the new repository.
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,
}

/// Validates the inputs and runs the provisioning workflow.
///
/// # Errors
///
/// Returns an error before any request is made if the repository name, the
/// token or the provisioning settings are unusable. Failures of individual
/// workflow steps are logged and reported in the returned report instead.
pub async fn execute(args: &SetupRepoArgs, config: &AppConfig) -> Result<ProvisioningReport, Error> {
    let repository_name = RepositoryName::new(args.repository_name.as_str())
        .map_err(|e| Error::InvalidArguments(e.to_string()))?;

    config
        .provisioning
        .validate()
        .map_err(|e| Error::Config(e.to_string()))?;

    let credential = Credential::personal_access_token(args.azure_access_token.as_str())?;
    let client = AzureDevOpsClient::new(credential)?;
    let git = GitCommandLine::new(&args.work_dir);

    info!(
        repository = %repository_name,
        organization = %config.provisioning.organization,
        "Provisioning repository"
    );

    let mut provisioner =
        RepositoryProvisioner::new(client, git, config.provisioning.clone(), repository_name);
    let report = provisioner.run().await;

    if !report.is_complete() {
        error!(?report, "Repository provisioning did not complete every step");
    }
    Ok(report)
}
