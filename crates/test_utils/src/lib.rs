//! Test utilities shared by the Pipeline Roller crates.
//!
//! This crate provides fixtures for the Azure Pipelines environment, naming
//! conventions for throw-away repositories, and local git sandboxes for
//! exercising remote migration without touching a real server.

use chrono::Utc;
use std::collections::HashMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// The predefined variables of a pull-request pipeline run.
///
/// Mirrors the sample values from the Azure DevOps documentation.
pub fn azure_devops_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("SYSTEM_COLLECTIONURI", "https://dev.azure.com/"),
        ("SYSTEM_PULLREQUEST_PULLREQUESTID", "22"),
        ("SYSTEM_TEAMPROJECT", "fabrikam"),
        ("BUILD_REPOSITORY_ID", "3411ebc1-d5aa-464f-9615-0b527bc66719"),
        ("SYSTEM_ACCESSTOKEN", "SYSTEM_ACCESSTOKEN"),
        ("BUILD_SOURCEVERSION", "ahkjs213687213"),
    ])
}

/// Turns a fixed variable map into a lookup function.
pub fn env_lookup(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
    move |key| vars.get(key).map(|value| value.to_string())
}

/// Extract the pipeline context from the Azure Pipelines environment for
/// repository naming.
///
/// Returns:
/// - `pr{number}` for pull-request validation runs (e.g., "pr22")
/// - `main` for builds of main/master
/// - the sanitized branch name for other branch builds
/// - `local` for local development
pub fn get_workflow_context() -> String {
    if let Ok(pr_id) = env::var("SYSTEM_PULLREQUEST_PULLREQUESTID") {
        if !pr_id.is_empty() {
            return format!("pr{}", pr_id);
        }
    }

    if let Ok(branch) = env::var("BUILD_SOURCEBRANCH") {
        if let Some(name) = branch.strip_prefix("refs/heads/") {
            if name == "main" || name == "master" {
                return "main".to_string();
            }
            return name.replace('/', "-");
        }
    }

    "local".to_string()
}

/// Generate a unique test repository name following the naming convention.
///
/// Format: `{prefix}-pipeline-roller-{context}-{timestamp}-{test-name}-{random}`
///
/// # Examples
///
/// ```
/// use test_utils::generate_test_repo_name;
///
/// let name = generate_test_repo_name("test", "basic");
/// // Result: test-pipeline-roller-local-20240108-120000-basic-a1b2c3 (local)
/// assert!(name.starts_with("test-pipeline-roller-"));
/// ```
pub fn generate_test_repo_name(prefix: &str, test_name: &str) -> String {
    let context = get_workflow_context();
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    let random_suffix = Uuid::new_v4().simple().to_string()[..6].to_lowercase();
    format!(
        "{}-pipeline-roller-{}-{}-{}-{}",
        prefix, context, timestamp, test_name, random_suffix
    )
}

/// Whether a `git` executable can be run on this machine.
///
/// Tests that shell out to git use this to skip themselves when it is missing.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// A throw-away working copy with a single commit and an `origin` remote,
/// plus a bare repository that can serve as a push target.
///
/// Both directories are removed when the sandbox is dropped.
pub struct GitSandbox {
    _root: TempDir,
    work_dir: PathBuf,
    bare_remote: PathBuf,
}

impl GitSandbox {
    /// Creates the working copy and the bare remote.
    ///
    /// The working copy's `origin` initially points at a path that does not
    /// exist, like a clone whose upstream moved away.
    pub fn new() -> io::Result<Self> {
        let root = tempfile::tempdir()?;
        let work_dir = root.path().join("work");
        let bare_remote = root.path().join("remote.git");
        std::fs::create_dir_all(&work_dir)?;

        run_git(root.path(), &["init", "--bare", "remote.git"])?;
        run_git(&work_dir, &["init"])?;
        run_git(&work_dir, &["config", "user.email", "ci@example.com"])?;
        run_git(&work_dir, &["config", "user.name", "CI"])?;
        std::fs::write(work_dir.join("README.md"), "# sample\n")?;
        run_git(&work_dir, &["add", "README.md"])?;
        run_git(&work_dir, &["commit", "-m", "Initial commit"])?;

        let stale_remote = root.path().join("moved-away.git");
        run_git(
            &work_dir,
            &["remote", "add", "origin", &stale_remote.to_string_lossy()],
        )?;

        debug!(path = %root.path().display(), "Created git sandbox");
        Ok(Self {
            _root: root,
            work_dir,
            bare_remote,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn bare_remote(&self) -> &Path {
        &self.bare_remote
    }

    /// The URL `origin` currently points at.
    pub fn origin_url(&self) -> io::Result<String> {
        let output = run_git(&self.work_dir, &["remote", "get-url", "origin"])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Branch names present in the bare remote.
    pub fn remote_branches(&self) -> io::Result<Vec<String>> {
        let output = run_git(
            &self.bare_remote,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
        )?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

fn run_git(dir: &Path, args: &[&str]) -> io::Result<Output> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(args = ?args, stderr = %stderr, "git command failed in sandbox");
        return Err(io::Error::other(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }
    Ok(output)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
