//! Sign-in, sessions and user management over HTTP

mod common;

use axum::http::StatusCode;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, PASSWORD, id_of, login, spawn_app};
use serde_json::{Value, json};

// =============================================================================
// Login / logout
// =============================================================================

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "ADMIN@empresa.com", "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert!(body["expires_at"].is_string());
    assert_eq!(body["profile"]["email"], ADMIN_EMAIL);
    assert_eq!(body["profile"]["role"], "admin");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_with_malformed_email() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "not-an-email", "password": "whatever" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["details"]["fields"][0]["field"], "email");
}

#[tokio::test]
async fn test_me_returns_current_profile() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&app.admin_token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], ADMIN_EMAIL);

    app.server
        .get("/auth/me")
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;

    app.server
        .post("/auth/logout")
        .authorization_bearer(&app.admin_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/auth/me")
        .authorization_bearer(&app.admin_token)
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// =============================================================================
// User registry
// =============================================================================

#[tokio::test]
async fn test_created_user_can_sign_in() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/users")
        .authorization_bearer(&app.admin_token)
        .json(&json!({
            "name": "Olga Operadora",
            "email": " Olga@Empresa.com ",
            "password": PASSWORD,
            "role": "operator"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let user: Value = response.json();
    assert_eq!(user["email"], "olga@empresa.com");
    assert!(user.get("password").is_none());

    let token = login(&app.server, "olga@empresa.com", PASSWORD).await;
    let me: Value = app
        .server
        .get("/auth/me")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(me["id"], user["id"]);
    assert_eq!(me["role"], "operator");
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/users")
        .authorization_bearer(&app.admin_token)
        .json(&json!({
            "name": "Outro Admin",
            "email": ADMIN_EMAIL,
            "password": PASSWORD,
            "role": "admin"
        }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "EMAIL_IN_USE");
}

#[tokio::test]
async fn test_user_registry_is_admin_only() {
    let app = spawn_app().await;
    let token = app.user_token("Olga Operadora", "operator").await;

    app.server
        .get("/users")
        .authorization_bearer(&token)
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inactive_user_cannot_sign_in() {
    let app = spawn_app().await;
    let token = app.user_token("Vera Viewer", "viewer").await;
    let me: Value = app
        .server
        .get("/auth/me")
        .authorization_bearer(&token)
        .await
        .json();

    app.server
        .put(&format!("/users/{}", id_of(&me)))
        .authorization_bearer(&app.admin_token)
        .json(&json!({ "status": "inactive" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "vera.viewer@empresa.com", "password": PASSWORD }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_user_loses_access() {
    let app = spawn_app().await;
    let token = app.user_token("Vera Viewer", "viewer").await;
    let me: Value = app
        .server
        .get("/auth/me")
        .authorization_bearer(&token)
        .await
        .json();

    app.server
        .delete(&format!("/users/{}", id_of(&me)))
        .authorization_bearer(&app.admin_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/auth/me")
        .authorization_bearer(&token)
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post("/auth/login")
        .json(&json!({ "email": "vera.viewer@empresa.com", "password": PASSWORD }))
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Navigation
// =============================================================================

fn top_level_keys(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_navigation_depends_on_role() {
    let app = spawn_app().await;

    let admin: Value = app
        .server
        .get("/navigation")
        .authorization_bearer(&app.admin_token)
        .await
        .json();
    assert!(top_level_keys(&admin).contains(&"administration".to_string()));

    let token = app.user_token("Vera Viewer", "viewer").await;
    let viewer: Value = app
        .server
        .get("/navigation")
        .authorization_bearer(&token)
        .await
        .json();
    assert!(!top_level_keys(&viewer).contains(&"administration".to_string()));
    assert!(top_level_keys(&viewer).contains(&"dashboard".to_string()));
}
