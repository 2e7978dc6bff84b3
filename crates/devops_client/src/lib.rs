//! Crate for interacting with the Azure DevOps REST API.
//!
//! This crate provides a client for making authenticated requests to Azure DevOps,
//! covering the two areas Pipeline Roller needs:
//!
//! - pull-request comment threads and attachments ([`PullRequestClient`])
//! - repository, pipeline and branch-policy provisioning ([`ProvisioningClient`])
//!
//! The client does not retry. Status codes that drive a caller's control flow
//! are returned as [`CreateOutcome`] values, all other unexpected statuses as
//! [`Error::UnexpectedStatus`].

use async_trait::async_trait;
use auth_handler::Credential;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{
    Attachment, CreateOutcome, ListResponse, Pipeline, PipelineId, Repository, RepositoryId,
};

pub mod pipeline;
pub use pipeline::PipelineCreatePayload;

pub mod policy;
pub use policy::PolicyConfigurationPayload;

pub mod pull_request;
pub use pull_request::{CommentThread, PullRequestTarget, PULL_REQUEST_API_VERSION};

pub mod repository;
pub use repository::{
    OrganizationEndpoint, RepositoryCreatePayload, DEFAULT_API_BASE_URL,
    PROVISIONING_API_VERSION,
};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Operations on a single pull request.
#[async_trait]
pub trait PullRequestClient: Send + Sync {
    /// Creates a new comment thread on the pull request.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedStatus` for any status other than 200.
    async fn create_thread(
        &self,
        target: &PullRequestTarget,
        thread: &CommentThread,
    ) -> Result<(), Error>;

    /// Uploads raw bytes as a pull-request attachment.
    ///
    /// A 201 whose body cannot be parsed yields an attachment without a URL.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedStatus` for any status other than 201.
    async fn upload_attachment(
        &self,
        target: &PullRequestTarget,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Attachment, Error>;
}

/// Operations used to provision a repository and its pipelines.
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Creates a git repository in the project named by the payload.
    ///
    /// HTTP 201 yields `Created`, HTTP 409 `AlreadyExists`, anything else
    /// `Failed(status)`.
    ///
    /// # Errors
    /// Returns an error if the request cannot be sent or a 201 body has no id.
    async fn create_repository(
        &self,
        endpoint: &OrganizationEndpoint,
        payload: &RepositoryCreatePayload,
    ) -> Result<CreateOutcome<RepositoryId>, Error>;

    /// Looks up a repository by name within a project.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedStatus` for any status other than 200.
    async fn get_repository(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        repository_name: &str,
    ) -> Result<Repository, Error>;

    /// Creates a pipeline in a project.
    ///
    /// A 200/201 response carrying an id yields `Created`, HTTP 409
    /// `AlreadyExists`, anything else `Failed(status)`.
    ///
    /// # Errors
    /// Returns an error only if the request cannot be sent.
    async fn create_pipeline(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        payload: &PipelineCreatePayload,
    ) -> Result<CreateOutcome<PipelineId>, Error>;

    /// Lists every pipeline of a project. Entries without a usable id are
    /// skipped.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedStatus` for any status other than 200.
    async fn list_pipelines(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
    ) -> Result<Vec<Pipeline>, Error>;

    /// Creates a policy configuration in a project.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedStatus` for any status other than 200.
    async fn create_policy_configuration(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        payload: &PolicyConfigurationPayload,
    ) -> Result<(), Error>;
}

/// A client for the Azure DevOps REST API, authenticated with a single credential.
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    credential: Credential,
}

impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("scheme", &self.credential.scheme())
            .finish()
    }
}

impl AzureDevOpsClient {
    /// Creates a new client that authenticates every request with `credential`.
    ///
    /// # Errors
    /// Returns `Error::AuthError` if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use auth_handler::Credential;
    /// use devops_client::AzureDevOpsClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let credential = Credential::bearer("pipeline-token")?;
    /// let client = AzureDevOpsClient::new(credential)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(credential: Credential) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pipeline-roller/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client");
                Error::AuthError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, credential })
    }

    fn authorization(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(self.credential.authorization_header().expose_secret())
            .map_err(|_| {
                Error::AuthError("Credential cannot be used as a header value".to_string())
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let request = request.header(AUTHORIZATION, self.authorization()?);
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Request to Azure DevOps failed");
            Error::Request(e)
        })?;

        info!(
            status = response.status().as_u16(),
            reason = reason(response.status()),
            "Received response from Azure DevOps"
        );
        Ok(response)
    }

    async fn send_json<T: serde::Serialize + ?Sized + Sync>(
        &self,
        request: RequestBuilder,
        body: &T,
    ) -> Result<Response, Error> {
        self.send(request.header(ACCEPT, "application/json").json(body))
            .await
    }
}

#[async_trait]
impl PullRequestClient for AzureDevOpsClient {
    #[instrument(skip(self, thread), fields(pull_request = %target.pull_request_id()))]
    async fn create_thread(
        &self,
        target: &PullRequestTarget,
        thread: &CommentThread,
    ) -> Result<(), Error> {
        let url = target.threads_url()?;
        info!(url = %url, "Sending pull request comment");

        let response = self.send_json(self.http.post(url), thread).await?;
        expect_status(response, StatusCode::OK).await?;
        Ok(())
    }

    #[instrument(skip(self, content), fields(pull_request = %target.pull_request_id(), size = content.len()))]
    async fn upload_attachment(
        &self,
        target: &PullRequestTarget,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Attachment, Error> {
        let url = target.attachment_url(file_name)?;
        info!(file_name = file_name, url = %url, "Uploading attachment");

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        let response = self.send(request).await?;
        let response = expect_status(response, StatusCode::CREATED).await?;

        // The upload has succeeded at this point; an unreadable body only
        // loses the link.
        let body = response.text().await.unwrap_or_default();
        let attachment = serde_json::from_str::<Attachment>(&body).unwrap_or_else(|e| {
            warn!(file_name = file_name, error = %e, "Attachment response body is not valid JSON");
            Attachment::default()
        });
        if attachment.url.is_none() {
            warn!(file_name = file_name, "Attachment response did not contain a URL");
        }
        Ok(attachment)
    }
}

#[async_trait]
impl ProvisioningClient for AzureDevOpsClient {
    #[instrument(skip(self, payload), fields(organization = %endpoint.organization(), repository = %payload.name))]
    async fn create_repository(
        &self,
        endpoint: &OrganizationEndpoint,
        payload: &RepositoryCreatePayload,
    ) -> Result<CreateOutcome<RepositoryId>, Error> {
        let url = endpoint.url(&["_apis", "git", "repositories"])?;
        let response = self.send_json(self.http.post(url), payload).await?;

        match response.status() {
            StatusCode::CREATED => {
                let body: models::IdOnly<RepositoryId> = parse_body(response).await?;
                Ok(CreateOutcome::Created(body.id))
            }
            StatusCode::CONFLICT => Ok(CreateOutcome::AlreadyExists),
            status => {
                log_failed_response("Failed to create repository", response).await;
                Ok(CreateOutcome::Failed(status.as_u16()))
            }
        }
    }

    #[instrument(skip(self), fields(organization = %endpoint.organization()))]
    async fn get_repository(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        repository_name: &str,
    ) -> Result<Repository, Error> {
        let url = endpoint.url(&[project, "_apis", "git", "repositories", repository_name])?;
        let response = self
            .send(self.http.get(url).header(ACCEPT, "application/json"))
            .await?;
        let response = expect_status(response, StatusCode::OK).await?;
        parse_body(response).await
    }

    #[instrument(skip(self, payload), fields(organization = %endpoint.organization(), pipeline = %payload.name))]
    async fn create_pipeline(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        payload: &PipelineCreatePayload,
    ) -> Result<CreateOutcome<PipelineId>, Error> {
        let url = endpoint.url(&[project, "_apis", "pipelines"])?;
        let response = self.send_json(self.http.post(url), payload).await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            return Ok(CreateOutcome::AlreadyExists);
        }

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let body = response.text().await?;
            return match serde_json::from_str::<models::IdOnly<PipelineId>>(&body) {
                Ok(created) => Ok(CreateOutcome::Created(created.id)),
                Err(e) => {
                    warn!(
                        status = status.as_u16(),
                        error = %e,
                        "Pipeline response did not contain an id"
                    );
                    Ok(CreateOutcome::Failed(status.as_u16()))
                }
            };
        }

        log_failed_response("Failed to create pipeline", response).await;
        Ok(CreateOutcome::Failed(status.as_u16()))
    }

    #[instrument(skip(self), fields(organization = %endpoint.organization()))]
    async fn list_pipelines(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
    ) -> Result<Vec<Pipeline>, Error> {
        let url = endpoint.url(&[project, "_apis", "pipelines"])?;
        let response = self
            .send(self.http.get(url).header(ACCEPT, "application/json"))
            .await?;
        let response = expect_status(response, StatusCode::OK).await?;

        let list: ListResponse<serde_json::Value> = parse_body(response).await?;
        let pipelines: Vec<Pipeline> = list
            .value
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Pipeline>(entry) {
                Ok(pipeline) => Some(pipeline),
                Err(e) => {
                    debug!(error = %e, "Skipping pipeline entry without a usable id");
                    None
                }
            })
            .collect();
        debug!(count = pipelines.len(), "Retrieved pipelines");
        Ok(pipelines)
    }

    #[instrument(skip(self, payload), fields(organization = %endpoint.organization()))]
    async fn create_policy_configuration(
        &self,
        endpoint: &OrganizationEndpoint,
        project: &str,
        payload: &PolicyConfigurationPayload,
    ) -> Result<(), Error> {
        let url = endpoint.url(&[project, "_apis", "policy", "configurations"])?;
        let response = self.send_json(self.http.post(url), payload).await?;
        expect_status(response, StatusCode::OK).await?;
        Ok(())
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

/// Passes the response through if it has the expected status, otherwise turns
/// it into `Error::UnexpectedStatus` carrying the body text.
async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, Error> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(
        status = status.as_u16(),
        expected = expected.as_u16(),
        response_body = %body,
        "Azure DevOps returned an unexpected status"
    );
    Err(Error::UnexpectedStatus {
        status: status.as_u16(),
        reason: reason(status).to_string(),
        body,
    })
}

async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        error!(error = %e, "Failed to parse Azure DevOps response body");
        Error::Deserialization(e)
    })
}

async fn log_failed_response(message: &str, response: Response) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(
        status = status.as_u16(),
        reason = reason(status),
        response_body = %body,
        "{}",
        message
    );
}
