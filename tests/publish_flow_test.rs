//! Repository publishing and secret provisioning against a mock source host

use appforge::github::secrets::{seal_secret, RepoPublicKey};
use appforge::{GithubClient, PublishError, RemoteRepository, SecretError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockito::Matcher;
use regex::Regex;
use std::time::Duration;

fn client(server: &mockito::ServerGuard) -> GithubClient {
    GithubClient::with_timeout(
        server.url(),
        "test-token".to_string(),
        Duration::from_secs(5),
    )
}

fn demo_repo() -> RemoteRepository {
    RemoteRepository {
        owner: "octo".to_string(),
        name: "demo-app".to_string(),
    }
}

#[tokio::test]
async fn test_resolve_name_without_collision() {
    let mut server = mockito::Server::new_async().await;
    let free = server
        .mock("GET", "/repos/octo/demo-app")
        .with_status(404)
        .create_async()
        .await;

    let name = client(&server)
        .resolve_repo_name("octo", "demo-app")
        .await
        .unwrap();

    assert_eq!(name, "demo-app");
    free.assert_async().await;
}

#[tokio::test]
async fn test_collision_picks_suffixed_name() {
    let mut server = mockito::Server::new_async().await;
    let _taken = server
        .mock("GET", "/repos/octo/demo-app")
        .with_status(200)
        .create_async()
        .await;
    let _free = server
        .mock(
            "GET",
            Matcher::Regex(r"^/repos/octo/demo-app-[0-9a-f]{8}$".to_string()),
        )
        .with_status(404)
        .create_async()
        .await;

    let name = client(&server)
        .resolve_repo_name("octo", "demo-app")
        .await
        .unwrap();

    let pattern = Regex::new(r"^demo-app-[0-9a-f]{8}$").unwrap();
    assert!(pattern.is_match(&name), "unexpected name: {}", name);
    assert_ne!(name, "demo-app");
}

#[tokio::test]
async fn test_double_collision_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _taken = server
        .mock(
            "GET",
            Matcher::Regex(r"^/repos/octo/demo-app(-[0-9a-f]{8})?$".to_string()),
        )
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let result = client(&server).resolve_repo_name("octo", "demo-app").await;
    assert!(matches!(result, Err(PublishError::NameExhausted(_))));
}

#[tokio::test]
async fn test_create_repo_parses_owner_and_name() {
    let mut server = mockito::Server::new_async().await;
    let created = server
        .mock("POST", "/user/repos")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "demo-app"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name": "demo-app", "owner": {"login": "octo"}}"#)
        .create_async()
        .await;

    let repo = client(&server).create_repo("demo-app").await.unwrap();
    assert_eq!(repo.full_name(), "octo/demo-app");
    created.assert_async().await;
}

#[tokio::test]
async fn test_create_file_commits_base64_content() {
    let mut server = mockito::Server::new_async().await;
    let push = server
        .mock("PUT", "/repos/octo/demo-app/contents/app.py")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "message": "initial commit",
            "content": STANDARD.encode("import streamlit as st\n"),
        })))
        .with_status(201)
        .with_body("{}")
        .create_async()
        .await;

    client(&server)
        .create_file(
            &demo_repo(),
            "app.py",
            "import streamlit as st\n",
            "initial commit",
        )
        .await
        .unwrap();

    push.assert_async().await;
}

#[tokio::test]
async fn test_update_file_sends_prior_sha() {
    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PUT", "/repos/octo/demo-app/contents/app.py")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "sha": "abc123",
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    client(&server)
        .update_file(&demo_repo(), "app.py", "new content", "update", "abc123")
        .await
        .unwrap();

    update.assert_async().await;
}

#[tokio::test]
async fn test_partial_push_failure_surfaces_status() {
    let mut server = mockito::Server::new_async().await;
    let _fail = server
        .mock("PUT", "/repos/octo/demo-app/contents/Procfile")
        .with_status(409)
        .with_body(r#"{"message": "conflict"}"#)
        .create_async()
        .await;

    let result = client(&server)
        .create_file(&demo_repo(), "Procfile", "web: x", "add Procfile")
        .await;

    match result {
        Err(PublishError::Api { status, .. }) => assert_eq!(status, 409),
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_secret_provisioning_flow() {
    let mut server = mockito::Server::new_async().await;
    let key_bytes = [7u8; 32];
    let key_body = format!(
        r#"{{"key_id": "568250167242549743", "key": "{}"}}"#,
        STANDARD.encode(key_bytes)
    );

    let key_fetch = server
        .mock("GET", "/repos/octo/demo-app/actions/secrets/public-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(key_body)
        .create_async()
        .await;
    let upload = server
        .mock("PUT", "/repos/octo/demo-app/actions/secrets/HEROKU_API_KEY")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "key_id": "568250167242549743",
        })))
        .with_status(201)
        .create_async()
        .await;

    let github = client(&server);
    let repo = demo_repo();

    let public_key = github.fetch_secret_public_key(&repo).await.unwrap();
    let sealed = seal_secret(&public_key, "heroku-api-key").unwrap();
    assert!(!sealed.encrypted_value.is_empty());

    github
        .put_repo_secret(&repo, "HEROKU_API_KEY", &sealed)
        .await
        .unwrap();

    key_fetch.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_key_fetch_failure_aborts() {
    let mut server = mockito::Server::new_async().await;
    let _denied = server
        .mock("GET", "/repos/octo/demo-app/actions/secrets/public-key")
        .with_status(403)
        .with_body(r#"{"message": "forbidden"}"#)
        .create_async()
        .await;

    let result = client(&server)
        .fetch_secret_public_key(&demo_repo())
        .await;

    match result {
        Err(SecretError::KeyFetch { status, .. }) => assert_eq!(status, 403),
        other => panic!("Expected KeyFetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_seal_rejects_malformed_key() {
    let bad = RepoPublicKey {
        key_id: "1".to_string(),
        key: "dG9vIHNob3J0".to_string(), // valid base64, wrong length
    };
    assert!(matches!(
        seal_secret(&bad, "value"),
        Err(SecretError::InvalidKey(_))
    ));
}

#[tokio::test]
async fn test_workflow_dispatch() {
    let mut server = mockito::Server::new_async().await;
    let dispatch = server
        .mock(
            "POST",
            "/repos/octo/demo-app/actions/workflows/deploy.yml/dispatches",
        )
        .match_body(Matcher::PartialJson(serde_json::json!({ "ref": "main" })))
        .with_status(204)
        .create_async()
        .await;

    client(&server)
        .dispatch_workflow(&demo_repo(), "deploy.yml", "main")
        .await
        .unwrap();

    dispatch.assert_async().await;
}
