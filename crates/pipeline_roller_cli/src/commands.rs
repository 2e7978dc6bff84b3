//! Command modules for the Pipeline Roller CLI.
//!
//! - `setup_repo_cmd`: provision a repository, its pipelines and branch policy
//! - `pr_comment_cmd`: post the infrastructure diff and validation reports
//! - `architecture_cmd`: post the architecture diagram
//! - `synth_cmd`: write the deployment manifest for an environment

pub mod architecture_cmd;
pub mod pr_comment_cmd;
pub mod setup_repo_cmd;
pub mod synth_cmd;
