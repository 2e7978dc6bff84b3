use clap::{Parser, Subcommand};
use config_manager::{PullRequestContext, ResourceTags};
use pipeline_roller_cli::commands::{
    architecture_cmd::{self, ArchitectureArgs},
    pr_comment_cmd::{self, PrCommentArgs},
    setup_repo_cmd::{self, SetupRepoArgs},
    synth_cmd::{self, SynthArgs},
};
use pipeline_roller_cli::config::{get_config_path, AppConfig};
use pipeline_roller_cli::errors::Error;
use pipeline_roller_cli::logging::{self, LogLevel};
use tracing::{error, info};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Pipeline Roller: CI/CD helpers for the infrastructure sample repository
#[derive(Parser)]
#[command(name = "pipeline-roller")]
#[command(about = "Provision Azure DevOps repositories and report on pull requests", long_about = None)]
struct Cli {
    /// Log level; defaults to AZURE_PIPELINES_LOG_LEVEL, then INFO.
    #[arg(long, global = true, value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Path to the application config file.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository with its pipelines and branch policy
    SetupRepo(SetupRepoArgs),

    /// Post the infrastructure diff and validation reports to the pull request
    PrComment(PrCommentArgs),

    /// Post the architecture diagram to the pull request
    Architecture(ArchitectureArgs),

    /// Write the deployment manifest for an environment
    Synth(SynthArgs),

    /// Show the CLI version
    Version,
}

fn fail(e: Error) -> ! {
    error!("Error: {e}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(logging::level_from_env(cli.log_level));

    match &cli.command {
        Commands::SetupRepo(args) => {
            let config = AppConfig::load_or_default(&get_config_path(cli.config.as_deref()))
                .unwrap_or_else(|e| fail(e));
            match setup_repo_cmd::execute(args, &config).await {
                Ok(report) if report.is_complete() => info!("Repository setup complete"),
                // Step failures have already been logged by the workflow.
                Ok(_) => {}
                Err(e) => fail(e),
            }
        }
        Commands::PrComment(args) => {
            let context = PullRequestContext::from_env().unwrap_or_else(|e| fail(e.into()));
            if let Err(e) = pr_comment_cmd::execute(args, &context).await {
                fail(e);
            }
        }
        Commands::Architecture(args) => {
            let context = PullRequestContext::from_env().unwrap_or_else(|e| fail(e.into()));
            if let Err(e) = architecture_cmd::execute(args, &context).await {
                fail(e);
            }
        }
        Commands::Synth(args) => {
            let tags = ResourceTags::from_env(&args.environment);
            if let Err(e) = synth_cmd::execute(args, tags) {
                fail(e);
            }
        }
        Commands::Version => {
            println!("pipeline-roller version {}", env!("CARGO_PKG_VERSION"));
        }
    }
}
