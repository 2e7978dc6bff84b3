//! Deployment manifest command.

use std::path::PathBuf;

use clap::Args;
use config_manager::{EnvironmentConfig, ResourceTags, DEFAULT_CONFIG_DIR};
use pipeline_roller_core::{deployment, DeploymentApp};
use tracing::info;

use crate::errors::Error;

#[cfg(test)]
#[path = "synth_cmd_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Environment name; selects `{config-dir}/{environment}.json`.
    #[arg(long, short = 'e')]
    pub environment: String,

    /// Directory holding the per-environment JSON files.
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Directory the manifest and templates are written to.
    #[arg(long, default_value = deployment::DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Builds the deployment app for the environment and writes its manifest.
/// Returns the manifest path.
pub fn execute(args: &SynthArgs, tags: ResourceTags) -> Result<PathBuf, Error> {
    let config = EnvironmentConfig::load(&args.config_dir, &args.environment)?;
    let mut app = DeploymentApp::new(config, tags);
    let manifest = app.synth(&args.output_dir)?;
    info!(manifest = %manifest.display(), "Deployment manifest written");
    Ok(manifest)
}
