mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array")
        .iter()
        .map(|doc| doc["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn create_injects_unread_and_timestamp() {
    let app = TestApp::new();
    let id = app.create("/contacts", json!({"name": "Jane Doe", "email": "jane@x.io", "message": "Hi"})).await;

    let doc = app.get(&format!("/contacts/{}", id)).await.body;
    assert_eq!(doc["status"], "unread");
    let created = doc["createdAt"].as_str().expect("createdAt string");
    assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok(), "bad timestamp {}", created);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = TestApp::new();
    for name in ["first", "second", "third"] {
        app.create("/contacts", json!({"name": name})).await;
    }

    let res = app.get("/contacts").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.body), vec!["third", "second", "first"]);
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
    let app = TestApp::new();
    app.create("/contacts", json!({"name": "Jane Doe", "email": "jd@x.io", "message": "hello"})).await;
    app.create("/contacts", json!({"name": "Bob", "email": "bob@x.io", "message": "ask JANE about it"})).await;
    app.create("/contacts", json!({"name": "Carl", "email": "carl@x.io", "message": "nothing"})).await;

    let res = app.get("/contacts?search=jane").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.body), vec!["Bob", "Jane Doe"]);

    // Regex metacharacters are matched literally
    let res = app.get("/contacts?search=.*").await;
    assert!(res.body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn status_filter_and_all() {
    let app = TestApp::new();
    let read = app.create("/contacts", json!({"name": "Read"})).await;
    app.create("/contacts", json!({"name": "Unread"})).await;

    let res = app.patch(&format!("/contacts/{}/status", read), json!({"status": "read"})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Contact status updated to read");

    assert_eq!(names(&app.get("/contacts?status=read").await.body), vec!["Read"]);
    assert_eq!(names(&app.get("/contacts?status=unread").await.body), vec!["Unread"]);
    assert_eq!(app.get("/contacts?status=all").await.body.as_array().expect("array").len(), 2);
    assert_eq!(
        names(&app.get("/contacts?search=read&status=unread").await.body),
        vec!["Unread"]
    );
}

#[tokio::test]
async fn malformed_query_uses_error_envelope() {
    let app = TestApp::new();

    let res = app.get("/contacts?search=a&search=b").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Invalid query string");
    assert!(res.body["details"].as_str().unwrap_or_default().contains("search"));
}
