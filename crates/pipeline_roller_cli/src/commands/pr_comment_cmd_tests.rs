use super::*;
use auth_handler::Credential;
use devops_client::PullRequestTarget;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const THREADS_PATH: &str = "/fabrikam/_apis/git/repositories/abc/pullRequests/22/threads";

fn messenger(server: &MockServer) -> PullRequestMessenger<AzureDevOpsClient> {
    let client = AzureDevOpsClient::new(Credential::bearer("token").unwrap()).unwrap();
    let target = PullRequestTarget::new(format!("{}/", server.uri()), "fabrikam", "abc", "22");
    PullRequestMessenger::new(client, target, "ahkjs")
}

fn args(dir: &TempDir) -> PrCommentArgs {
    PrCommentArgs {
        output_file: dir.path().join("output.log"),
        reports_dir: dir.path().join("templates"),
    }
}

#[tokio::test]
async fn test_missing_output_posts_no_change_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(THREADS_PATH))
        .and(body_partial_json(json!({
            "comments": [{"content": "CDK Diff found no resource is going to change"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let outcome = post_report(&messenger(&server), &args(&dir)).await.unwrap();

    assert!(outcome.diff_posted);
    assert!(outcome.reports.posted.is_empty());
}

#[tokio::test]
async fn test_diff_and_reports_are_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(THREADS_PATH))
        .and(body_partial_json(json!({
            "comments": [{"content": "Stack mrht-dev-sample-stack\nThere were no differences"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(THREADS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let args = args(&dir);
    std::fs::write(
        &args.output_file,
        "Stack mrht-dev-sample-stack\nThere were no differences",
    )
    .unwrap();
    std::fs::create_dir_all(&args.reports_dir).unwrap();
    std::fs::write(
        args.reports_dir.join("AwsSolutions-mrht-dev-sample-stack-NagReport.csv"),
        "Rule ID,Compliance\nAwsSolutions-S1,Suppressed\n",
    )
    .unwrap();
    std::fs::write(args.reports_dir.join("empty.csv"), "Rule ID,Compliance\n").unwrap();

    let outcome = post_report(&messenger(&server), &args).await.unwrap();

    assert!(outcome.diff_posted);
    assert_eq!(outcome.reports.posted.len(), 1);
    assert_eq!(outcome.reports.skipped_empty.len(), 1);
}

#[tokio::test]
async fn test_rejected_diff_comment_still_posts_reports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(THREADS_PATH))
        .and(body_partial_json(json!({
            "comments": [{"content": "CDK Diff found no resource is going to change"}]
        })))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(THREADS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let args = args(&dir);
    std::fs::create_dir_all(&args.reports_dir).unwrap();
    std::fs::write(args.reports_dir.join("a.csv"), "Rule\nS1\n").unwrap();

    let outcome = post_report(&messenger(&server), &args).await.unwrap();

    assert!(!outcome.diff_posted);
    assert_eq!(outcome.reports.posted.len(), 1);
}

#[tokio::test]
async fn test_unreadable_output_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let args = PrCommentArgs {
        output_file: dir.path().to_path_buf(),
        reports_dir: dir.path().join("templates"),
    };

    let result = post_report(&messenger(&server), &args).await;

    assert!(matches!(result, Err(Error::Workflow(_))));
}

fn context_for(server: &MockServer) -> PullRequestContext {
    let collection_uri = format!("{}/", server.uri());
    let fixture = test_utils::azure_devops_env();
    PullRequestContext::from_lookup(move |key| {
        if key == "SYSTEM_COLLECTIONURI" {
            Some(collection_uri.clone())
        } else {
            fixture.get(key).map(|value| value.to_string())
        }
    })
    .unwrap()
}

#[tokio::test]
async fn test_execute_posts_to_pipeline_pull_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/fabrikam/_apis/git/repositories/3411ebc1-d5aa-464f-9615-0b527bc66719/pullRequests/22/threads",
        ))
        .and(header("Authorization", "Bearer SYSTEM_ACCESSTOKEN"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let outcome = execute(&args(&dir), &context_for(&server)).await.unwrap();

    assert!(outcome.diff_posted);
}
