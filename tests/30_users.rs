mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn duplicate_email_never_inserts_twice() {
    let app = TestApp::new();
    let user = json!({"name": "Jane", "email": "jane@example.com", "role": "user"});

    app.create("/users", user.clone()).await;

    let res = app.post("/users", user).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body, json!({"error": "User already exists"}));

    let all = app.get("/users").await.body;
    assert_eq!(all.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn lookup_by_email() {
    let app = TestApp::new();
    let id = app.create("/users", json!({"name": "Sam", "email": "sam@example.com", "role": "admin"})).await;

    let res = app.get("/users/email/sam@example.com").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["_id"], id.as_str());
    assert_eq!(res.body["role"], "admin");

    let res = app.get("/users/email/nobody@example.com").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "User not found");
}

#[tokio::test]
async fn role_change_is_restricted_to_known_roles() {
    let app = TestApp::new();
    let id = app.create("/users", json!({"email": "role@example.com", "role": "user"})).await;
    let uri = format!("/users/{}/role", id);

    let res = app.patch(&uri, json!({"role": "guest"})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Invalid role. Must be 'admin' or 'user'.");
    assert_eq!(app.get(&format!("/users/{}", id)).await.body["role"], "user");

    let res = app.patch(&uri, json!({"role": "admin"})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "User role updated to admin");
    assert_eq!(app.get(&format!("/users/{}", id)).await.body["role"], "admin");
}

#[tokio::test]
async fn role_body_without_role_is_rejected() {
    let app = TestApp::new();
    let id = app.create("/users", json!({"email": "empty@example.com", "role": "user"})).await;

    let res = app.patch(&format!("/users/{}/role", id), json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn identity_field_cannot_be_submitted() {
    let app = TestApp::new();

    let res = app
        .post("/users", json!({"_id": "6f1c1f4e-3b7e-4b39-9d8e-0d8f5f2a9c11", "email": "id@example.com"}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.get("/users").await.body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn users_without_email_are_not_duplicates() {
    let app = TestApp::new();

    app.create("/users", json!({"name": "No Email"})).await;
    app.create("/users", json!({"name": "Also No Email"})).await;
    app.create("/users", json!({"name": "Null Email", "email": null})).await;

    assert_eq!(app.get("/users").await.body.as_array().expect("array").len(), 3);
}
