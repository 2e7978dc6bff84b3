use super::*;
use crate::errors::Error;
use crate::test_fakes::{FakeProvisioningClient, ProvisioningCall};
use auth_handler::Credential;
use devops_client::{AzureDevOpsClient, Pipeline, Repository};
use serde_json::json;
use std::sync::Mutex;
use tracing_test::traced_test;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARENT_PROJECT_ID: &str = "26546064-040a-41ae-949a-c8f35fa94a9b";
const SOURCE_PROJECT: &str = "cdk-projects";

/// Records git invocations; optionally fails the push.
#[derive(Default)]
struct FakeGit {
    calls: Mutex<Vec<String>>,
    fail_push: bool,
}

impl GitRemote for FakeGit {
    fn set_remote_url(&self, remote: &str, url: &str) -> Result<(), Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("remote set-url {remote} {url}"));
        Ok(())
    }

    fn push_all(&self, remote: &str) -> Result<(), Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("push -u {remote} --all"));
        if self.fail_push {
            return Err(Error::Git {
                command: "push -u origin --all".to_string(),
                message: "Permission denied (publickey)".to_string(),
            });
        }
        Ok(())
    }
}

fn settings() -> ProvisioningSettings {
    ProvisioningSettings {
        organization: "mrh-trowe".to_string(),
        parent_project_id: PARENT_PROJECT_ID.to_string(),
        source_project_name: SOURCE_PROJECT.to_string(),
        ..ProvisioningSettings::default()
    }
}

fn provisioner(
    client: FakeProvisioningClient,
) -> RepositoryProvisioner<FakeProvisioningClient, FakeGit> {
    RepositoryProvisioner::new(
        client,
        FakeGit::default(),
        settings(),
        RepositoryName::new("my-repo").unwrap(),
    )
}

fn pipeline(id: u64, name: &str) -> Pipeline {
    Pipeline {
        id: PipelineId::new(id),
        name: name.to_string(),
        folder: None,
    }
}

#[tokio::test]
async fn test_create_repository_stores_id() {
    let client = FakeProvisioningClient::default();
    *client.create_repository.lock().unwrap() =
        Some(Ok(CreateOutcome::Created(RepositoryId::new("new-id"))));
    let mut provisioner = provisioner(client);

    assert!(provisioner.create_repository().await);
    assert_eq!(provisioner.repository_id().unwrap().as_str(), "new-id");
    assert_eq!(
        provisioner.client().calls(),
        vec![ProvisioningCall::CreateRepository {
            name: "my-repo".to_string()
        }]
    );
}

#[tokio::test]
async fn test_existing_repository_is_looked_up() {
    let client = FakeProvisioningClient::default();
    *client.create_repository.lock().unwrap() = Some(Ok(CreateOutcome::AlreadyExists));
    *client.get_repository.lock().unwrap() = Some(Ok(Repository {
        id: RepositoryId::new("existing-id"),
        name: "my-repo".to_string(),
        remote_url: None,
        ssh_url: None,
        web_url: None,
    }));
    let mut provisioner = provisioner(client);

    assert!(provisioner.create_repository().await);
    assert_eq!(provisioner.repository_id().unwrap().as_str(), "existing-id");
    assert_eq!(
        provisioner.client().calls()[1],
        ProvisioningCall::GetRepository {
            project: PARENT_PROJECT_ID.to_string(),
            name: "my-repo".to_string()
        }
    );
}

#[tokio::test]
async fn test_existing_repository_lookup_failure() {
    let client = FakeProvisioningClient::default();
    *client.create_repository.lock().unwrap() = Some(Ok(CreateOutcome::AlreadyExists));
    *client.get_repository.lock().unwrap() = Some(Err(404));
    let mut provisioner = provisioner(client);

    assert!(!provisioner.create_repository().await);
    assert!(provisioner.repository_id().is_none());
}

#[tokio::test]
async fn test_create_repository_failure() {
    let client = FakeProvisioningClient::default();
    *client.create_repository.lock().unwrap() = Some(Ok(CreateOutcome::Failed(401)));
    let mut provisioner = provisioner(client);

    assert!(!provisioner.create_repository().await);
    assert!(provisioner.repository_id().is_none());
    assert_eq!(provisioner.client().calls().len(), 1);
}

#[traced_test]
#[tokio::test]
async fn test_pipelines_without_repository_id_make_no_calls() {
    let mut provisioner = provisioner(FakeProvisioningClient::default());

    let results = provisioner.create_pipelines().await;

    assert!(results.is_empty());
    assert!(provisioner.client().calls().is_empty());
    assert!(logs_contain("Repository id not set"));
}

#[tokio::test]
async fn test_pipelines_are_created_in_order() {
    let mut provisioner = provisioner(FakeProvisioningClient::default());
    provisioner.create_repository().await;

    let results = provisioner.create_pipelines().await;

    assert_eq!(
        results,
        vec![
            (PipelineStage::Development, true),
            (PipelineStage::PullRequest, true),
            (PipelineStage::Release, true),
        ]
    );
    let calls = provisioner.client().calls();
    assert_eq!(
        calls[1..],
        [
            ProvisioningCall::CreatePipeline {
                project: PARENT_PROJECT_ID.to_string(),
                name: "my-repo-development".to_string(),
                path: "/azure-pipelines.yml".to_string(),
            },
            ProvisioningCall::CreatePipeline {
                project: PARENT_PROJECT_ID.to_string(),
                name: "my-repo-pull-request".to_string(),
                path: "/azure-pipelines-pull-request.yml".to_string(),
            },
            ProvisioningCall::CreatePipeline {
                project: PARENT_PROJECT_ID.to_string(),
                name: "my-repo-release".to_string(),
                path: "/azure-pipelines-release.yml".to_string(),
            },
        ]
    );
    // The fake hands out ids 101, 102, 103 in creation order.
    assert_eq!(provisioner.pull_request_pipeline_id(), Some(PipelineId::new(102)));
}

#[tokio::test]
async fn test_pull_request_pipeline_falls_back_to_search() {
    let client = FakeProvisioningClient::default();
    client.create_pipeline.lock().unwrap().extend([
        CreateOutcome::Created(PipelineId::new(1)),
        CreateOutcome::AlreadyExists,
        CreateOutcome::AlreadyExists,
    ]);
    *client.list_pipelines.lock().unwrap() = Some(Ok(vec![
        pipeline(7, "other-repo-pull-request"),
        pipeline(8, "my-repo-development"),
        pipeline(9, "my-repo-pull-request"),
    ]));
    let mut provisioner = provisioner(client);
    provisioner.create_repository().await;

    let results = provisioner.create_pipelines().await;

    assert_eq!(results[1], (PipelineStage::PullRequest, false));
    assert_eq!(provisioner.pull_request_pipeline_id(), Some(PipelineId::new(9)));
    assert!(provisioner
        .client()
        .calls()
        .contains(&ProvisioningCall::ListPipelines {
            project: SOURCE_PROJECT.to_string()
        }));
}

#[tokio::test]
async fn test_pull_request_pipeline_search_takes_first_match() {
    let client = FakeProvisioningClient::default();
    client.create_pipeline.lock().unwrap().extend([
        CreateOutcome::Created(PipelineId::new(1)),
        CreateOutcome::Failed(200),
    ]);
    *client.list_pipelines.lock().unwrap() = Some(Ok(vec![
        pipeline(3, "my-repo-extra-pull-request"),
        pipeline(9, "my-repo-pull-request"),
    ]));
    let mut provisioner = provisioner(client);
    provisioner.create_repository().await;

    provisioner.create_pipelines().await;

    assert_eq!(provisioner.pull_request_pipeline_id(), Some(PipelineId::new(3)));
}

#[tokio::test]
async fn test_pull_request_pipeline_search_without_match() {
    let client = FakeProvisioningClient::default();
    client.create_pipeline.lock().unwrap().extend([
        CreateOutcome::Created(PipelineId::new(1)),
        CreateOutcome::AlreadyExists,
    ]);
    *client.list_pipelines.lock().unwrap() = Some(Err(500));
    let mut provisioner = provisioner(client);
    provisioner.create_repository().await;

    provisioner.create_pipelines().await;

    assert!(provisioner.pull_request_pipeline_id().is_none());
}

#[tokio::test]
async fn test_policy_without_pipeline_id_makes_no_call() {
    let client = FakeProvisioningClient::default();
    let mut provisioner = provisioner(client);
    provisioner.create_repository().await;

    assert!(!provisioner.create_branch_policy().await);
    assert_eq!(provisioner.client().calls().len(), 1);
}

#[tokio::test]
async fn test_policy_is_created_in_source_project() {
    let mut provisioner = provisioner(FakeProvisioningClient::default());
    provisioner.create_repository().await;
    provisioner.create_pipelines().await;

    assert!(provisioner.create_branch_policy().await);
    assert_eq!(
        provisioner.client().calls().last(),
        Some(&ProvisioningCall::CreatePolicy {
            project: SOURCE_PROJECT.to_string()
        })
    );
}

#[tokio::test]
async fn test_policy_rejection_returns_false() {
    let client = FakeProvisioningClient::default();
    *client.create_policy.lock().unwrap() = Some(400);
    let mut provisioner = provisioner(client);
    provisioner.create_repository().await;
    provisioner.create_pipelines().await;

    assert!(!provisioner.create_branch_policy().await);
}

#[test]
fn test_migrate_history_runs_git_commands() {
    let provisioner = provisioner(FakeProvisioningClient::default());

    assert!(provisioner.migrate_history());
    assert_eq!(
        *provisioner.git.calls.lock().unwrap(),
        vec![
            "remote set-url origin git@ssh.dev.azure.com:v3/mrh-trowe/cdk-projects/my-repo"
                .to_string(),
            "push -u origin --all".to_string(),
        ]
    );
}

#[test]
fn test_migrate_history_failure_returns_false() {
    let provisioner = RepositoryProvisioner::new(
        FakeProvisioningClient::default(),
        FakeGit {
            fail_push: true,
            ..FakeGit::default()
        },
        settings(),
        RepositoryName::new("my-repo").unwrap(),
    );

    assert!(!provisioner.migrate_history());
}

#[tokio::test]
async fn test_run_aborts_when_repository_is_unavailable() {
    let client = FakeProvisioningClient::default();
    *client.create_repository.lock().unwrap() = Some(Err(500));
    let mut provisioner = provisioner(client);

    let report = provisioner.run().await;

    assert!(!report.repository_ready);
    assert!(report.pipelines.is_empty());
    assert!(!report.is_complete());
    assert_eq!(provisioner.client().calls().len(), 1);
    assert!(provisioner.git.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_completes_every_step() {
    let mut provisioner = provisioner(FakeProvisioningClient::default());

    let report = provisioner.run().await;

    assert!(report.is_complete());
    assert_eq!(provisioner.git.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_against_mock_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mrh-trowe/_apis/git/repositories"))
        .and(query_param("api-version", "7.0"))
        .and(header("authorization", "Basic OnBhdA=="))
        .and(body_partial_json(json!({
            "name": "my-repo",
            "project": {"id": PARENT_PROJECT_ID}
        })))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/mrh-trowe/{PARENT_PROJECT_ID}/_apis/git/repositories/my-repo"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "repo-guid"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/mrh-trowe/{PARENT_PROJECT_ID}/_apis/pipelines")))
        .and(body_partial_json(json!({"name": "my-repo-pull-request"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/mrh-trowe/{PARENT_PROJECT_ID}/_apis/pipelines")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/mrh-trowe/{SOURCE_PROJECT}/_apis/policy/configurations"
        )))
        .and(body_partial_json(json!({
            "settings": {
                "buildDefinitionId": 42,
                "scope": [{"repositoryId": "repo-guid", "refName": "refs/heads/master", "matchKind": "exact"}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureDevOpsClient::new(Credential::personal_access_token("pat").unwrap()).unwrap();
    let mut provisioner = RepositoryProvisioner::new(
        client,
        FakeGit::default(),
        ProvisioningSettings {
            api_base_url: server.uri(),
            ..settings()
        },
        RepositoryName::new("my-repo").unwrap(),
    );

    let report = provisioner.run().await;

    assert!(report.is_complete());
    assert_eq!(provisioner.repository_id().unwrap().as_str(), "repo-guid");
    assert_eq!(provisioner.pull_request_pipeline_id(), Some(PipelineId::new(42)));
}
