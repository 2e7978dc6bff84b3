use super::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PR_PATH: &str =
    "/fabrikam/_apis/git/repositories/3411ebc1-d5aa-464f-9615-0b527bc66719/pullRequests/22";

fn context_for(server: &MockServer) -> PullRequestContext {
    let collection_uri = format!("{}/", server.uri());
    let fixture = test_utils::azure_devops_env();
    PullRequestContext::from_lookup(move |key| match key {
        "SYSTEM_COLLECTIONURI" => Some(collection_uri.clone()),
        _ => fixture.get(key).map(|value| value.to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_missing_diagram_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(path_regex(".*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let args = ArchitectureArgs {
        diagram: dir.path().join("diagram.png"),
    };

    let uploaded = execute(&args, &context_for(&server)).await.unwrap();

    assert!(!uploaded);
}

#[tokio::test]
async fn test_uploaded_diagram_is_linked_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{PR_PATH}/attachments/diagram-ahkjs.png")))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 3,
            "url": "https://dev.azure.com/attachments/diagram-ahkjs.png"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{PR_PATH}/threads")))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let diagram = dir.path().join("diagram.png");
    std::fs::write(&diagram, [0x89, 0x50, 0x4e, 0x47]).unwrap();

    let uploaded = execute(&ArchitectureArgs { diagram }, &context_for(&server))
        .await
        .unwrap();

    assert!(uploaded);
}

#[tokio::test]
async fn test_rejected_upload_posts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("/attachments/"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{PR_PATH}/threads")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let diagram = dir.path().join("diagram.png");
    std::fs::write(&diagram, b"png").unwrap();

    let uploaded = execute(&ArchitectureArgs { diagram }, &context_for(&server))
        .await
        .unwrap();

    assert!(!uploaded);
}
