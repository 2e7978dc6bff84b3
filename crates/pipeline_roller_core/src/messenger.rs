//! Posting comments and attachments to the pull request of a pipeline run.

use std::path::Path;

use config_manager::PullRequestContext;
use devops_client::{CommentThread, PullRequestClient, PullRequestTarget};
use tracing::{error, info, instrument, warn};

#[cfg(test)]
#[path = "messenger_tests.rs"]
mod tests;

/// Writes to a single pull request.
///
/// Every operation reports success as a `bool`; failures are logged and never
/// retried.
pub struct PullRequestMessenger<C> {
    client: C,
    target: PullRequestTarget,
    commit_sha_prefix: String,
}

impl<C: PullRequestClient> PullRequestMessenger<C> {
    pub fn new(
        client: C,
        target: PullRequestTarget,
        commit_sha_prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            target,
            commit_sha_prefix: commit_sha_prefix.into(),
        }
    }

    pub fn from_context(client: C, context: &PullRequestContext) -> Self {
        Self::new(client, context.target(), context.commit_sha_prefix())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn target(&self) -> &PullRequestTarget {
        &self.target
    }

    /// File name the diagram of this commit is uploaded under.
    pub fn attachment_file_name(&self) -> String {
        format!("diagram-{}.png", self.commit_sha_prefix)
    }

    /// Posts `text` as a new single-comment thread.
    #[instrument(skip(self, text), fields(pull_request_id = self.target.pull_request_id()))]
    pub async fn post_comment(&self, text: &str) -> bool {
        let thread = CommentThread::single(text);
        match self.client.create_thread(&self.target, &thread).await {
            Ok(()) => {
                info!("Pull request comment posted");
                true
            }
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Failed to post pull request comment");
                false
            }
        }
    }

    /// Uploads the file at `path` as the architecture diagram of this commit
    /// and links it from two follow-up comments.
    ///
    /// Returns `false` without contacting the server when the file does not
    /// exist. The result reflects the upload only; the follow-up comments are
    /// best effort.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload_attachment(&self, path: &Path) -> bool {
        if !path.is_file() {
            error!("Attachment file does not exist");
            return false;
        }

        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "Failed to read attachment file");
                return false;
            }
        };

        let file_name = self.attachment_file_name();
        info!(file_name = %file_name, bytes = content.len(), "Uploading attachment");

        let attachment = match self
            .client
            .upload_attachment(&self.target, &file_name, content)
            .await
        {
            Ok(attachment) => attachment,
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Failed to upload attachment");
                return false;
            }
        };

        let url = attachment.url.unwrap_or_else(|| {
            warn!("Attachment response did not contain a URL");
            String::new()
        });

        self.post_comment(&format!("[Architecture Diagram]({url})"))
            .await;
        self.post_comment(&format!(
            "<img src=\"{url}\" alt=\"Architecture Diagram\">"
        ))
        .await;

        true
    }
}
