//! Local git operations used to move a working copy to its new remote.
//!
//! Commands run through the `git` executable so that the user's SSH agent and
//! credential helpers apply to the push.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info};

use crate::errors::Error;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

/// The remote-facing operations of a local working copy.
pub trait GitRemote: Send + Sync {
    /// Points the named remote at `url`.
    fn set_remote_url(&self, remote: &str, url: &str) -> Result<(), Error>;

    /// Pushes every local branch to `remote` and records it as upstream.
    fn push_all(&self, remote: &str) -> Result<(), Error>;
}

/// Runs `git` in a working directory.
#[derive(Debug, Clone)]
pub struct GitCommandLine {
    work_dir: PathBuf,
}

impl GitCommandLine {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn run(&self, args: &[&str]) -> Result<String, Error> {
        let command = args.join(" ");
        debug!(command = %command, dir = %self.work_dir.display(), "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| Error::Git {
                command: command.clone(),
                message: format!("failed to run git: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(command = %command, status = ?output.status.code(), stderr = %stderr, "git command failed");
            return Err(Error::Git {
                command,
                message: stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitRemote for GitCommandLine {
    fn set_remote_url(&self, remote: &str, url: &str) -> Result<(), Error> {
        self.run(&["remote", "set-url", remote, url])?;
        info!(remote = remote, url = url, "Updated git remote");
        Ok(())
    }

    fn push_all(&self, remote: &str) -> Result<(), Error> {
        self.run(&["push", "-u", remote, "--all"])?;
        info!(remote = remote, "Pushed all branches");
        Ok(())
    }
}
