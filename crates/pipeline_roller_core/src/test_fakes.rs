//! In-memory client fakes shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use devops_client::{
    Attachment, CommentThread, CreateOutcome, Error, OrganizationEndpoint, Pipeline,
    PipelineCreatePayload, PipelineId, PolicyConfigurationPayload, ProvisioningClient,
    PullRequestClient, PullRequestTarget, Repository, RepositoryCreatePayload, RepositoryId,
};

pub(crate) fn status_error(status: u16) -> Error {
    Error::UnexpectedStatus {
        status,
        reason: "Test".to_string(),
        body: String::new(),
    }
}

/// Records every comment and upload; answers from scripted queues.
#[derive(Default)]
pub(crate) struct FakePullRequestClient {
    pub comments: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
    /// Statuses for successive `create_thread` calls; empty means success.
    pub thread_failures: Mutex<VecDeque<Option<u16>>>,
    pub upload_result: Mutex<Option<Result<Attachment, u16>>>,
}

impl FakePullRequestClient {
    pub fn failing_threads(statuses: Vec<Option<u16>>) -> Self {
        Self {
            thread_failures: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    pub fn with_upload(result: Result<Attachment, u16>) -> Self {
        Self {
            upload_result: Mutex::new(Some(result)),
            ..Self::default()
        }
    }

    pub fn comments(&self) -> Vec<String> {
        self.comments.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl PullRequestClient for FakePullRequestClient {
    async fn create_thread(
        &self,
        _target: &PullRequestTarget,
        thread: &CommentThread,
    ) -> Result<(), Error> {
        let content = thread
            .comments
            .first()
            .map(|c| c.content.clone())
            .unwrap_or_default();
        self.comments.lock().unwrap().push(content);

        match self.thread_failures.lock().unwrap().pop_front().flatten() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn upload_attachment(
        &self,
        _target: &PullRequestTarget,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Attachment, Error> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), content));

        match self.upload_result.lock().unwrap().clone() {
            Some(Ok(attachment)) => Ok(attachment),
            Some(Err(status)) => Err(status_error(status)),
            None => Ok(Attachment::default()),
        }
    }
}

/// A provisioning call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ProvisioningCall {
    CreateRepository { name: String },
    GetRepository { project: String, name: String },
    CreatePipeline { project: String, name: String, path: String },
    ListPipelines { project: String },
    CreatePolicy { project: String },
}

/// Scripted answers for each provisioning operation.
pub(crate) struct FakeProvisioningClient {
    pub calls: Mutex<Vec<ProvisioningCall>>,
    pub create_repository: Mutex<Option<Result<CreateOutcome<RepositoryId>, u16>>>,
    pub get_repository: Mutex<Option<Result<Repository, u16>>>,
    /// Answers for successive pipeline creations; missing entries are `Created`.
    pub create_pipeline: Mutex<VecDeque<CreateOutcome<PipelineId>>>,
    pub list_pipelines: Mutex<Option<Result<Vec<Pipeline>, u16>>>,
    pub create_policy: Mutex<Option<u16>>,
    next_pipeline_id: Mutex<u64>,
}

impl Default for FakeProvisioningClient {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            create_repository: Mutex::new(None),
            get_repository: Mutex::new(None),
            create_pipeline: Mutex::new(VecDeque::new()),
            list_pipelines: Mutex::new(None),
            create_policy: Mutex::new(None),
            next_pipeline_id: Mutex::new(100),
        }
    }
}

impl FakeProvisioningClient {
    pub fn calls(&self) -> Vec<ProvisioningCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProvisioningCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProvisioningClient for FakeProvisioningClient {
    async fn create_repository(
        &self,
        _endpoint: &OrganizationEndpoint,
        payload: &RepositoryCreatePayload,
    ) -> Result<CreateOutcome<RepositoryId>, Error> {
        self.record(ProvisioningCall::CreateRepository {
            name: payload.name.clone(),
        });
        match self.create_repository.lock().unwrap().clone() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(status)) => Err(status_error(status)),
            None => Ok(CreateOutcome::Created(RepositoryId::new("repo-id"))),
        }
    }

    async fn get_repository(
        &self,
        _endpoint: &OrganizationEndpoint,
        project: &str,
        repository_name: &str,
    ) -> Result<Repository, Error> {
        self.record(ProvisioningCall::GetRepository {
            project: project.to_string(),
            name: repository_name.to_string(),
        });
        match self.get_repository.lock().unwrap().clone() {
            Some(Ok(repository)) => Ok(repository),
            Some(Err(status)) => Err(status_error(status)),
            None => Err(status_error(404)),
        }
    }

    async fn create_pipeline(
        &self,
        _endpoint: &OrganizationEndpoint,
        project: &str,
        payload: &PipelineCreatePayload,
    ) -> Result<CreateOutcome<PipelineId>, Error> {
        self.record(ProvisioningCall::CreatePipeline {
            project: project.to_string(),
            name: payload.name.clone(),
            path: payload.configuration.path.clone(),
        });
        if let Some(outcome) = self.create_pipeline.lock().unwrap().pop_front() {
            return Ok(outcome);
        }
        let mut next = self.next_pipeline_id.lock().unwrap();
        *next += 1;
        Ok(CreateOutcome::Created(PipelineId::new(*next)))
    }

    async fn list_pipelines(
        &self,
        _endpoint: &OrganizationEndpoint,
        project: &str,
    ) -> Result<Vec<Pipeline>, Error> {
        self.record(ProvisioningCall::ListPipelines {
            project: project.to_string(),
        });
        match self.list_pipelines.lock().unwrap().clone() {
            Some(Ok(pipelines)) => Ok(pipelines),
            Some(Err(status)) => Err(status_error(status)),
            None => Ok(Vec::new()),
        }
    }

    async fn create_policy_configuration(
        &self,
        _endpoint: &OrganizationEndpoint,
        project: &str,
        _payload: &PolicyConfigurationPayload,
    ) -> Result<(), Error> {
        self.record(ProvisioningCall::CreatePolicy {
            project: project.to_string(),
        });
        match *self.create_policy.lock().unwrap() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}
