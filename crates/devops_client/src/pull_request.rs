//! Pull-request thread and attachment types.

use serde::Serialize;
use url::Url;

use crate::Error;

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;

/// API version used by the pull-request thread and attachment endpoints.
pub const PULL_REQUEST_API_VERSION: &str = "7.1";

/// Thread status `active`.
const THREAD_STATUS_ACTIVE: u8 = 1;

/// Comment type `text`.
const COMMENT_TYPE_TEXT: u8 = 1;

/// Identifies the pull request that comments and attachments are posted to.
///
/// # Examples
///
/// ```rust
/// use devops_client::PullRequestTarget;
///
/// let target = PullRequestTarget::new("https://dev.azure.com/", "fabrikam", "abc", "22");
/// assert_eq!(
///     target.threads_url().unwrap().as_str(),
///     "https://dev.azure.com/fabrikam/_apis/git/repositories/abc/pullRequests/22/threads?api-version=7.1"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestTarget {
    collection_uri: String,
    project: String,
    repository_id: String,
    pull_request_id: String,
    api_version: String,
}

impl PullRequestTarget {
    pub fn new(
        collection_uri: impl Into<String>,
        project: impl Into<String>,
        repository_id: impl Into<String>,
        pull_request_id: impl Into<String>,
    ) -> Self {
        Self {
            collection_uri: collection_uri.into(),
            project: project.into(),
            repository_id: repository_id.into(),
            pull_request_id: pull_request_id.into(),
            api_version: PULL_REQUEST_API_VERSION.to_string(),
        }
    }

    pub fn collection_uri(&self) -> &str {
        &self.collection_uri
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn pull_request_id(&self) -> &str {
        &self.pull_request_id
    }

    /// URL of the comment threads collection of the pull request.
    ///
    /// # Errors
    /// Returns `Error::InvalidUrl` if the collection URI cannot be parsed.
    pub fn threads_url(&self) -> Result<Url, Error> {
        self.url(&["threads"])
    }

    /// URL used to upload an attachment with the given file name.
    ///
    /// # Errors
    /// Returns `Error::InvalidUrl` if the collection URI cannot be parsed.
    pub fn attachment_url(&self, file_name: &str) -> Result<Url, Error> {
        self.url(&["attachments", file_name])
    }

    fn url(&self, tail: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.collection_uri)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.collection_uri, e)))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::InvalidUrl(format!(
                    "{}: collection URI cannot be a base",
                    self.collection_uri
                ))
            })?;
            segments.pop_if_empty().extend([
                self.project.as_str(),
                "_apis",
                "git",
                "repositories",
                self.repository_id.as_str(),
                "pullRequests",
                self.pull_request_id.as_str(),
            ]);
            segments.extend(tail);
        }

        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

/// A single comment inside a thread.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadComment {
    pub parent_comment_id: u32,
    pub content: String,
    pub comment_type: u8,
}

/// Payload for creating a new pull-request comment thread.
#[derive(Clone, Debug, Serialize)]
pub struct CommentThread {
    pub comments: Vec<ThreadComment>,
    pub status: u8,
}

impl CommentThread {
    /// An active thread holding exactly one text comment.
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            comments: vec![ThreadComment {
                parent_comment_id: 1,
                content: content.into(),
                comment_type: COMMENT_TYPE_TEXT,
            }],
            status: THREAD_STATUS_ACTIVE,
        }
    }
}
