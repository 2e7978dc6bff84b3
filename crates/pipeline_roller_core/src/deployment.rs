//! The deployment app: configuration, tags and stacks for one environment,
//! synthesized into a manifest on disk.

use std::path::{Path, PathBuf};

use config_manager::{EnvironmentConfig, ResourceTags};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::Error;
use crate::stack::{DeploymentEnvironment, StackDefinition};

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;

pub const DEFAULT_OUTPUT_DIR: &str = "cdk.out";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Where the deployment tool stages file and image assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSynthesizer {
    pub file_assets_bucket_name: String,
    pub image_assets_repository_name: String,
}

impl Default for StackSynthesizer {
    fn default() -> Self {
        Self {
            file_assets_bucket_name: "mrht-cdk-bucket-assets-${AWS::AccountId}-${AWS::Region}"
                .to_string(),
            image_assets_repository_name: "mrht-cdk-repository".to_string(),
        }
    }
}

pub struct DeploymentApp {
    config: EnvironmentConfig,
    tags: ResourceTags,
    synthesizer: StackSynthesizer,
    default_env: DeploymentEnvironment,
    stacks: Vec<StackDefinition>,
}

impl DeploymentApp {
    /// Prepares an app for the environment `config` was loaded for.
    ///
    /// The target account and region come from the `AccountId` and
    /// `AWSRegion` keys.
    pub fn new(config: EnvironmentConfig, tags: ResourceTags) -> Self {
        let default_env = DeploymentEnvironment {
            account: config.get_string("AccountId"),
            region: config.get_string("AWSRegion"),
        };

        Self {
            config,
            tags,
            synthesizer: StackSynthesizer::default(),
            default_env,
            stacks: Vec::new(),
        }
    }

    pub fn environment(&self) -> &str {
        self.config.environment()
    }

    pub fn stacks(&self) -> &[StackDefinition] {
        &self.stacks
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.iter().map(|s| s.stack_name.as_str()).collect()
    }

    pub fn create_stacks(&mut self) {
        let stack = StackDefinition::sample(self.environment(), self.default_env.clone());
        info!(stack = %stack.stack_name, "Declared stack");
        self.stacks.push(stack);
    }

    /// Applies every resource tag to every declared stack.
    pub fn assign_tags(&mut self) {
        for stack in &mut self.stacks {
            for (key, value) in self.tags.iter() {
                stack.add_tag(key, value);
            }
        }
    }

    /// Declares the stacks, tags them and writes the manifest plus one
    /// template per stack into `out_dir`. Returns the manifest path.
    #[instrument(skip(self), fields(environment = %self.config.environment(), out_dir = %out_dir.display()))]
    pub fn synth(&mut self, out_dir: &Path) -> Result<PathBuf, Error> {
        if self.stacks.is_empty() {
            self.create_stacks();
        }
        self.assign_tags();

        std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

        let mut stack_entries = Vec::with_capacity(self.stacks.len());
        for stack in &self.stacks {
            let template_file = format!("{}.template.json", stack.stack_name);
            let template_path = out_dir.join(&template_file);
            let content = serde_json::to_string_pretty(&stack.template())?;
            std::fs::write(&template_path, content).map_err(|e| Error::io(&template_path, e))?;

            stack_entries.push(json!({
                "stackName": stack.stack_name,
                "constructId": stack.construct_id,
                "environment": stack.environment,
                "tags": stack.tags,
                "templateFile": template_file,
            }));
        }

        let manifest = json!({
            "environment": self.environment(),
            "synthesizer": self.synthesizer,
            "stacks": stack_entries,
        });
        let manifest_path = out_dir.join(MANIFEST_FILE_NAME);
        std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(|e| Error::io(&manifest_path, e))?;

        info!(stacks = ?self.stack_names(), manifest = %manifest_path.display(), "Synthesized deployment");
        Ok(manifest_path)
    }
}
