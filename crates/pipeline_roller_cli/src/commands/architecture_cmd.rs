//! Architecture diagram command.

use std::path::PathBuf;

use clap::Args;
use config_manager::PullRequestContext;
use devops_client::AzureDevOpsClient;
use pipeline_roller_core::PullRequestMessenger;
use tracing::{error, info};

use crate::errors::Error;

#[cfg(test)]
#[path = "architecture_cmd_tests.rs"]
mod tests;

pub const DEFAULT_DIAGRAM_PATH: &str = "./cdk.out/cdkgraph/diagram.png";

#[derive(Args, Debug)]
pub struct ArchitectureArgs {
    /// Rendered architecture diagram to upload.
    #[arg(long, default_value = DEFAULT_DIAGRAM_PATH)]
    pub diagram: PathBuf,
}

/// Uploads the diagram and links it from the pull request. Returns whether
/// the upload succeeded.
pub async fn execute(args: &ArchitectureArgs, context: &PullRequestContext) -> Result<bool, Error> {
    let client = AzureDevOpsClient::new(context.credential()?)?;
    let messenger = PullRequestMessenger::from_context(client, context);

    info!(diagram = %args.diagram.display(), "Uploading architecture diagram");
    let uploaded = messenger.upload_attachment(&args.diagram).await;
    if uploaded {
        info!("Architecture diagram added to the pull request");
    } else {
        error!("Failed to upload architecture diagram");
    }
    Ok(uploaded)
}
