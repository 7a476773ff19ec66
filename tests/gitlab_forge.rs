//! Integration tests for the GitLab project source.
//!
//! The GitLab API is served by wiremock. The end-to-end clone test points
//! project URLs at local bare repositories so no network is needed.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gitfleet::forge::gitlab::GitLabSource;
use gitfleet::forge::{ForgeError, ProjectSource};

const TOKEN: &str = "glpat-test";

fn project_json(id: u64, path: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": path.rsplit('/').next().unwrap(),
        "path_with_namespace": path,
        "ssh_url_to_repo": format!("git@gitlab.example.com:{}.git", path),
        "http_url_to_repo": format!("https://gitlab.example.com/{}.git", path),
        "web_url": format!("https://gitlab.example.com/{}", path),
    })
}

fn page_of(count: u64, offset: u64) -> serde_json::Value {
    let projects: Vec<_> = (0..count)
        .map(|i| project_json(offset + i, &format!("group/p{}", offset + i)))
        .collect();
    json!(projects)
}

// =============================================================================
// Listing
// =============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn single_page_with_token_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("membership", "true"))
            .and(query_param("page", "1"))
            .and(header("PRIVATE-TOKEN", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                project_json(1, "infra/tools"),
                project_json(2, "web/site"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let source = GitLabSource::new(server.uri(), TOKEN).unwrap();
        let projects = source.list_projects().await.unwrap();

        let paths: Vec<_> = projects
            .iter()
            .map(|p| p.path_with_namespace.as_str())
            .collect();
        assert_eq!(paths, vec!["infra/tools", "web/site"]);
        assert_eq!(projects[0].id, 1);
        assert_eq!(
            projects[0].clone_url(false),
            "git@gitlab.example.com:infra/tools.git"
        );
    }

    #[tokio::test]
    async fn follows_next_page_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", "2")
                    .set_body_json(page_of(2, 0)),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", "")
                    .set_body_json(page_of(1, 2)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = GitLabSource::new(server.uri(), TOKEN).unwrap();
        let projects = source.list_projects().await.unwrap();

        assert_eq!(projects.len(), 3);
        assert_eq!(projects[2].path_with_namespace, "group/p2");
    }

    #[tokio::test]
    async fn full_page_without_header_requests_next() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(100, 0)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(5, 100)))
            .expect(1)
            .mount(&server)
            .await;

        let source = GitLabSource::new(server.uri(), TOKEN).unwrap();
        let projects = source.list_projects().await.unwrap();

        assert_eq!(projects.len(), 105);
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let source = GitLabSource::new(format!("{}/", server.uri()), TOKEN).unwrap();
        assert!(source.list_projects().await.unwrap().is_empty());
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;

    async fn list_with_status(status: u16, body: serde_json::Value) -> ForgeError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        GitLabSource::new(server.uri(), TOKEN)
            .unwrap()
            .list_projects()
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn unauthorized_is_auth_failure() {
        let err = list_with_status(401, json!({"message": "401 Unauthorized"})).await;
        assert!(matches!(err, ForgeError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn forbidden_includes_message() {
        let err = list_with_status(403, json!({"message": "403 Forbidden"})).await;
        match err {
            ForgeError::AuthFailed(message) => assert!(message.contains("403 Forbidden")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn rate_limited() {
        let err = list_with_status(429, json!({})).await;
        assert!(matches!(err, ForgeError::RateLimited));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let err = list_with_status(502, json!({"error": "bad gateway"})).await;
        match err {
            ForgeError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert!(message.starts_with("GitLab server error"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = GitLabSource::new(server.uri(), TOKEN)
            .unwrap()
            .list_projects()
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 200, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let err = GitLabSource::new("http://127.0.0.1:9", TOKEN)
            .unwrap()
            .list_projects()
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::NetworkError(_)));
    }
}

// =============================================================================
// End to end: gitfleet clone
// =============================================================================

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// A bare repository with one commit, standing in for a hosted project.
fn hosted_repo(root: &Path, name: &str) -> String {
    let seed = root.join(format!("{name}-seed"));
    std::fs::create_dir_all(&seed).unwrap();
    run_git(&seed, &["init", "-q", "-b", "main"]);
    run_git(&seed, &["config", "user.email", "test@example.com"]);
    run_git(&seed, &["config", "user.name", "Test User"]);
    run_git(&seed, &["config", "commit.gpgsign", "false"]);
    std::fs::write(seed.join("README.md"), name).unwrap();
    run_git(&seed, &["add", "."]);
    run_git(&seed, &["commit", "-q", "-m", "init"]);

    let bare = root.join(format!("{name}.git"));
    run_git(
        root,
        &["clone", "-q", "--bare", seed.to_str().unwrap(), bare.to_str().unwrap()],
    );
    bare.to_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn clone_command_mirrors_namespaces() {
    let hosting = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let tools = hosted_repo(hosting.path(), "tools");
    let site = hosted_repo(hosting.path(), "site");
    std::fs::create_dir_all(work.path().join("web/site")).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(header("PRIVATE-TOKEN", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "path_with_namespace": "infra/tools",
                "ssh_url_to_repo": tools,
                "http_url_to_repo": "https://unused.invalid/infra/tools.git",
            },
            {
                "id": 2,
                "path_with_namespace": "web/site",
                "ssh_url_to_repo": site,
                "http_url_to_repo": "https://unused.invalid/web/site.git",
            },
        ])))
        .mount(&server)
        .await;

    Command::cargo_bin("gitfleet")
        .unwrap()
        .env("HOME", home.path())
        .env("GITFLEET_CONFIG", home.path().join("config.toml"))
        .env("GITLAB_URL", server.uri())
        .env("GITLAB_TOKEN", TOKEN)
        .env_remove("XDG_CONFIG_HOME")
        .arg("clone")
        .arg(work.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cloned"))
        .stderr(predicate::str::contains(
            "1 repository processed, 1 skipped (already exists)",
        ));

    assert!(work.path().join("infra/tools/.git").is_dir());
    assert!(work.path().join("infra/tools/README.md").is_file());
    assert!(!work.path().join("web/site/.git").exists());
}
