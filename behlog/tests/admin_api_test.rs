use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use behlog::api::router::ApiRoutes;
use behlog::app_state::{AppState, SharedAppState};
use behlog::settings::config::Settings;
use behlog::stop_flag::StopFlag;
use behlog_core::authorization::{
    AssignmentStore, Permission, PolicyDocument, PolicyStore, RoleStore, UserId,
};
use behlog_core::settings::api_server::ApiServer;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

struct TestApp {
    server: TestServer,
    state: SharedAppState,
    editor_id: Uuid,
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// admin holds Administrator, editor holds Editor (Post.Edit), nobody holds
/// nothing.
async fn create_test_app() -> TestApp {
    let store = Arc::new(PolicyStore::in_memory(PolicyDocument::default_policy()));
    let admin_role = store
        .find_role_by_name("Administrator")
        .await
        .unwrap()
        .unwrap();
    let editor = store.create_role("Editor", "Edits posts").await.unwrap();
    store
        .add_claim(editor.id, Permission::PostEdit.into())
        .await
        .unwrap();
    store
        .assign_role(&UserId::new("admin"), admin_role.id)
        .await
        .unwrap();
    store
        .assign_role(&UserId::new("editor"), editor.id)
        .await
        .unwrap();

    let tokens: HashMap<String, String> = [
        ("admin", "admin-token"),
        ("editor", "editor-token"),
        ("nobody", "nobody-token"),
    ]
    .into_iter()
    .map(|(id, token)| (id.to_string(), token.to_string()))
    .collect();
    let settings = Settings {
        api: ApiServer::new("127.0.0.1:0", tokens),
        ..Default::default()
    };

    let state = AppState::from_parts(settings, StopFlag::new(), store);
    let server = TestServer::new(ApiRoutes::create(state.clone())).unwrap();

    TestApp {
        server,
        state,
        editor_id: editor.id,
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_test_app().await;
    let response = app.server.get("/api/v1/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let app = create_test_app().await;

    let response = app.server.get("/api/v1/authenticated/admin/roles").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("wrong-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/api/v1/authenticated/me/permissions")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_without_roles_is_forbidden() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("nobody-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_lacks_role_management() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .json(&json!({ "name": "Author" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(app
        .state
        .store
        .find_role_by_name("Author")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_my_permissions() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/v1/authenticated/me/permissions")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["user_id"], "editor");
    assert_eq!(body["roles"], json!(["Editor"]));
    assert_eq!(body["permissions"], json!(["Post.Edit"]));

    let response = app
        .server
        .get("/api/v1/authenticated/me/permissions")
        .add_header(AUTHORIZATION, bearer("nobody-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["permissions"], json!([]));
}

#[tokio::test]
async fn test_list_roles_with_user_counts() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    let roles = body["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0]["name"], "Administrator");
    assert_eq!(roles[0]["user_count"], 1);
    assert_eq!(roles[1]["name"], "Editor");
    assert_eq!(
        roles[1]["claims"],
        json!([{ "type": "Permission", "value": "Post.Edit" }])
    );
}

#[tokio::test]
async fn test_create_role_conflict_and_validation() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "name": "Author", "description": "Writes drafts" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["version"], 1);

    let response = app
        .server
        .post("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "name": "author" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = app
        .server
        .post("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "name": "  " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_granting_a_claim_takes_effect_on_next_request() {
    let app = create_test_app().await;
    let claims_path = format!("/api/v1/authenticated/admin/roles/{}/claims", app.editor_id);

    // editor cannot list roles yet
    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .post(&claims_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Role.View" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["change"], "added");

    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // granting twice is a no-op
    let response = app
        .server
        .post(&claims_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Role.View" }))
        .await;
    assert_eq!(response.json::<Value>()["change"], "unchanged");

    let response = app
        .server
        .delete(&claims_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Role.View" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_claim_errors() {
    let app = create_test_app().await;
    let claims_path = format!("/api/v1/authenticated/admin/roles/{}/claims", app.editor_id);

    let response = app
        .server
        .post(&claims_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Post.Archive" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .delete(&claims_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Post.Delete" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!(
            "/api/v1/authenticated/admin/roles/{}/claims",
            Uuid::new_v4()
        ))
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "type": "Permission", "value": "Post.View" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_claims_with_expected_version() {
    let app = create_test_app().await;
    let path = format!(
        "/api/v1/authenticated/admin/roles/{}/claims/Permission",
        app.editor_id
    );
    let version = app
        .state
        .store
        .get_role(app.editor_id)
        .await
        .unwrap()
        .version;

    let response = app
        .server
        .put(&path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "values": ["Post.View", "Post.Edit"], "expected_version": version }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["added"], json!(["Post.View"]));
    assert_eq!(body["removed"], json!([]));
    assert_eq!(body["version"], version + 1);

    // replaying with the now stale version conflicts
    let response = app
        .server
        .put(&path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "values": [], "expected_version": version }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_assignments_round_trip() {
    let app = create_test_app().await;
    let assign_path = format!(
        "/api/v1/authenticated/admin/users/nobody/roles/{}",
        app.editor_id
    );

    let response = app
        .server
        .post(&assign_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["assigned"], true);

    let response = app
        .server
        .get("/api/v1/authenticated/admin/users/nobody/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.json::<Value>()["roles"][0]["name"], "Editor");

    let response = app
        .server
        .get(&format!(
            "/api/v1/authenticated/admin/roles/{}/users",
            app.editor_id
        ))
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(
        response.json::<Value>()["users"],
        json!(["editor", "nobody"])
    );

    let response = app
        .server
        .delete(&assign_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .delete(&assign_path)
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_role_revokes_access() {
    let app = create_test_app().await;

    let response = app
        .server
        .delete(&format!(
            "/api/v1/authenticated/admin/roles/{}",
            app.editor_id
        ))
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get("/api/v1/authenticated/me/permissions")
        .add_header(AUTHORIZATION, bearer("editor-token"))
        .await;
    assert_eq!(response.json::<Value>()["roles"], json!([]));

    let response = app
        .server
        .get(&format!(
            "/api/v1/authenticated/admin/roles/{}",
            app.editor_id
        ))
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_test_app().await;
    let response = app.server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert!(body["paths"]
        .as_object()
        .unwrap()
        .contains_key("/api/v1/authenticated/admin/roles/{role_id}/claims"));
}

#[tokio::test]
async fn test_store_failure_is_service_unavailable() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path().join("policies");
    std::fs::create_dir(&dir).unwrap();
    let store = Arc::new(PolicyStore::open(dir.join("policy.yaml")).await.unwrap());
    let admin_role = store.list_roles().await.unwrap().remove(0);
    store
        .assign_role(&UserId::new("admin"), admin_role.id)
        .await
        .unwrap();

    let settings = Settings {
        api: ApiServer::new(
            "127.0.0.1:0",
            HashMap::from([("admin".to_string(), "admin-token".to_string())]),
        ),
        ..Default::default()
    };
    let state = AppState::from_parts(settings, StopFlag::new(), store);
    let server = TestServer::new(ApiRoutes::create(state)).unwrap();

    std::fs::remove_dir_all(&dir).unwrap();

    let response = server
        .post("/api/v1/authenticated/admin/roles")
        .add_header(AUTHORIZATION, bearer("admin-token"))
        .json(&json!({ "name": "Author" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.text().contains("policies"));
}
