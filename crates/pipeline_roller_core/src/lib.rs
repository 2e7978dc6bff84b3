//! # Pipeline Roller Core
//!
//! The workflows behind the `pipeline-roller` commands.
//!
//! ## Overview
//!
//! - [`PullRequestMessenger`] posts comments and the architecture diagram to
//!   the pull request of a pipeline run.
//! - [`pr_report`] turns the infrastructure diff and the validation reports
//!   into pull-request comments.
//! - [`RepositoryProvisioner`] creates a repository with its pipelines, moves
//!   the local history there and protects the default branch.
//! - [`DeploymentApp`] declares the sample stack for an environment and writes
//!   its manifest.
//!
//! Every remote call goes through the traits of `devops_client`, so the
//! workflows can be exercised against in-memory fakes.

pub mod deployment;
pub mod errors;
pub mod git;
pub mod messenger;
pub mod pipeline_stage;
pub mod pr_report;
pub mod provisioning;
pub mod repository_name;
pub mod stack;
pub mod validation_report;

#[cfg(test)]
mod test_fakes;

pub use deployment::{DeploymentApp, StackSynthesizer};
pub use errors::{Error, ValidationError};
pub use git::{GitCommandLine, GitRemote};
pub use messenger::PullRequestMessenger;
pub use pipeline_stage::PipelineStage;
pub use pr_report::{attach_validation_reports, compose_diff_comment, read_output, ReportSummary};
pub use provisioning::{ProvisioningReport, RepositoryProvisioner};
pub use repository_name::RepositoryName;
pub use stack::{DeploymentEnvironment, StackDefinition};
pub use validation_report::ValidationTable;
