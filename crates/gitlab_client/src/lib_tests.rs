//! Tests for the GitLab client using a mocked HTTP server.

use super::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn group_json(id: u64, parent_id: Option<u64>) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("group-{id}"),
        "path": format!("group-{id}"),
        "full_path": format!("group-{id}"),
        "parent_id": parent_id,
        "web_url": format!("https://gitlab.example.com/group-{id}"),
    })
}

fn test_project() -> Project {
    Project {
        id: 17,
        name: "tool".to_string(),
        path_with_namespace: "infra/tool".to_string(),
    }
}

fn client_for(server: &MockServer) -> GitLabClient {
    GitLabClient::builder(server.uri(), "secret-token")
        .build()
        .expect("client should build against the mock server URI")
}

#[test]
fn test_builder_rejects_invalid_host() {
    let result = GitLabClient::builder("not a url", "token").build();
    assert!(matches!(result, Err(Error::InvalidHost(_))));
}

#[test]
fn test_builder_rejects_non_http_scheme() {
    let result = GitLabClient::builder("ftp://gitlab.example.com", "token").build();
    assert!(matches!(result, Err(Error::InvalidHost(_))));
}

#[tokio::test]
async fn test_list_all_groups_follows_pagination() {
    let server = MockServer::start().await;

    let first_page: Vec<_> = (1..=100).map(|id| group_json(id, None)).collect();
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(header("PRIVATE-TOKEN", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&first_page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([group_json(101, Some(1))])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let groups = client.list_all_groups().await.expect("listing should succeed");

    assert_eq!(groups.len(), 101);
    assert_eq!(groups[0].id, 1);
    assert_eq!(groups[100].id, 101);
    assert_eq!(groups[100].parent_id, Some(1));
}

#[tokio::test]
async fn test_list_all_groups_single_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([group_json(1, None)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let groups = client.list_all_groups().await.expect("listing should succeed");
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn test_get_group_encodes_full_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/infra%2Fnetworking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "networking",
            "path": "networking",
            "full_path": "infra/networking",
            "parent_id": 7,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let group = client
        .get_group("infra/networking")
        .await
        .expect("group should be found");
    assert_eq!(group.id, 42);
    assert_eq!(group.parent_id, Some(7));
}

#[tokio::test]
async fn test_get_group_maps_401_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "401 Unauthorized"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_group("infra").await;
    assert!(matches!(result, Err(Error::Auth { status: 401, .. })));
}

#[tokio::test]
async fn test_get_group_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "404 Group Not Found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_group("missing").await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_list_projects_uses_group_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/42/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 17,
            "name": "tool",
            "path_with_namespace": "infra/tool",
        }])))
        .mount(&server)
        .await;

    let group = Group {
        id: 42,
        name: "infra".to_string(),
        path: "infra".to_string(),
        full_path: "infra".to_string(),
        parent_id: None,
    };
    let client = client_for(&server);
    let projects = client
        .list_projects(&group)
        .await
        .expect("project listing should succeed");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].path_with_namespace, "infra/tool");
}

#[tokio::test]
async fn test_unprotect_branch_encodes_wildcard_pattern() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/17/protected_branches/release%2F*"))
        .and(header("PRIVATE-TOKEN", "secret-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .unprotect_branch(&test_project(), "release/*")
        .await
        .expect("unprotect should succeed");
}

#[tokio::test]
async fn test_protect_branch_sends_access_levels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/17/protected_branches"))
        .and(query_param("name", "main"))
        .and(query_param("push_access_level", "40"))
        .and(query_param("merge_access_level", "30"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "main",
            "push_access_levels": [{"access_level": 40, "access_level_description": "Maintainers"}],
            "merge_access_levels": [{"access_level": 30, "access_level_description": "Developers + Maintainers"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let protection = client
        .protect_branch(
            &test_project(),
            "main",
            AccessLevel::MAINTAINER,
            AccessLevel::DEVELOPER,
        )
        .await
        .expect("protect should succeed");

    assert_eq!(protection.name, "main");
    assert_eq!(protection.push_access_levels.len(), 1);
    assert_eq!(
        protection.push_access_levels[0].access_level,
        AccessLevel::MAINTAINER
    );
    assert_eq!(
        protection.merge_access_levels[0].access_level,
        AccessLevel::DEVELOPER
    );
}

#[tokio::test]
async fn test_protect_branch_maps_api_error_with_body_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "Protected branch 'main' already exists"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .protect_branch(
            &test_project(),
            "main",
            AccessLevel::MAINTAINER,
            AccessLevel::MAINTAINER,
        )
        .await;

    match result {
        Err(Error::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 422);
            assert!(message.contains("already exists"));
        }
        other => panic!("expected Error::Api, got {other:?}"),
    }
}
