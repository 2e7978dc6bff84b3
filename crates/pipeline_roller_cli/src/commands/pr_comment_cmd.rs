//! Pull-request report command: diff output plus validation reports.

use std::path::PathBuf;

use clap::Args;
use config_manager::PullRequestContext;
use devops_client::{AzureDevOpsClient, PullRequestClient};
use pipeline_roller_core::{
    attach_validation_reports, compose_diff_comment, pr_report, read_output,
    PullRequestMessenger, ReportSummary,
};
use tracing::{error, info};

use crate::errors::Error;

#[cfg(test)]
#[path = "pr_comment_cmd_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct PrCommentArgs {
    /// Output of the infrastructure diff run.
    #[arg(long, default_value = pr_report::DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Directory holding the CSV validation reports.
    #[arg(long, default_value = pr_report::DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,
}

/// What the command posted.
#[derive(Debug)]
pub struct PrCommentOutcome {
    pub diff_posted: bool,
    pub reports: ReportSummary,
}

pub async fn execute(
    args: &PrCommentArgs,
    context: &PullRequestContext,
) -> Result<PrCommentOutcome, Error> {
    let client = AzureDevOpsClient::new(context.credential()?)?;
    let messenger = PullRequestMessenger::from_context(client, context);
    post_report(&messenger, args).await
}

/// Posts the diff comment, then every validation report.
///
/// # Errors
///
/// Returns an error only if the diff output exists but cannot be read.
pub async fn post_report<C: PullRequestClient>(
    messenger: &PullRequestMessenger<C>,
    args: &PrCommentArgs,
) -> Result<PrCommentOutcome, Error> {
    let output = read_output(&args.output_file).await?;
    let comment = compose_diff_comment(output.as_deref());

    info!("Adding infrastructure diff comment");
    let diff_posted = messenger.post_comment(&comment).await;
    if !diff_posted {
        error!("Failed to add infrastructure diff comment");
    }

    let reports = attach_validation_reports(messenger, &args.reports_dir).await;
    info!(
        posted = reports.posted.len(),
        skipped = reports.skipped_empty.len(),
        failed = reports.failed.len(),
        "Validation reports processed"
    );

    Ok(PrCommentOutcome {
        diff_posted,
        reports,
    })
}
