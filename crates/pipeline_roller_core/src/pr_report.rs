//! Assembling the pull-request report: infrastructure diff and validation
//! reports.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use devops_client::PullRequestClient;
use tracing::{error, info, warn};

use crate::errors::Error;
use crate::messenger::PullRequestMessenger;
use crate::validation_report::ValidationTable;

#[cfg(test)]
#[path = "pr_report_tests.rs"]
mod tests;

pub const DEFAULT_OUTPUT_FILE: &str = "./output.log";
pub const DEFAULT_REPORTS_DIR: &str = "./synth/templates/";

/// Posted when the diff run produced no output.
pub const NO_CHANGES_MESSAGE: &str = "CDK Diff found no resource is going to change";

/// Reads the diff output.
///
/// A missing file yields `None`; every other I/O failure is returned.
pub async fn read_output(path: &Path) -> Result<Option<String>, Error> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(path = %path.display(), "Diff output file not found");
            Ok(None)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read diff output file");
            Err(Error::io(path, e))
        }
    }
}

/// The comment text for a diff output, falling back to the no-change message
/// when there is nothing to show.
pub fn compose_diff_comment(content: Option<&str>) -> String {
    match content {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_CHANGES_MESSAGE.to_string(),
    }
}

/// Outcome of posting every report of a directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub posted: Vec<PathBuf>,
    pub skipped_empty: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Posts every non-empty `*.csv` report in `dir` as one markdown comment.
///
/// Files are processed in name order. A file that cannot be read or whose
/// comment is rejected is recorded as failed and does not stop the others.
/// A missing directory is not an error.
pub async fn attach_validation_reports<C: PullRequestClient>(
    messenger: &PullRequestMessenger<C>,
    dir: &Path,
) -> ReportSummary {
    let mut summary = ReportSummary::default();

    let reports = match csv_files(dir) {
        Ok(Some(reports)) => reports,
        Ok(None) => {
            warn!(dir = %dir.display(), "Validation report directory not found");
            return summary;
        }
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "Failed to list validation reports");
            return summary;
        }
    };

    for path in reports {
        let table = match ValidationTable::from_path(&path) {
            Ok(table) => table,
            Err(e) => {
                error!(file = %path.display(), error = %e, "Failed to parse validation report");
                summary.failed.push(path);
                continue;
            }
        };

        if table.is_empty() {
            info!(file = %path.display(), "Validation report is empty, skipping");
            summary.skipped_empty.push(path);
            continue;
        }

        info!(file = %path.display(), rows = table.row_count(), "Adding validation report");
        if messenger.post_comment(&table.to_markdown()).await {
            summary.posted.push(path);
        } else {
            error!(file = %path.display(), "Failed to add validation report");
            summary.failed.push(path);
        }
    }

    summary
}

fn csv_files(dir: &Path) -> Result<Option<Vec<PathBuf>>, Error> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(Some(files))
}
