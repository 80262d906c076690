//! Signup, login, session, and profile flows.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use artisan_collective_integration_tests::{TestApp, json_body};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No database pool behind the in-memory stores, so readiness is
    // unconditional
    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let app = TestApp::new();

    let response = app
        .post_multipart("/api/signup", &[("username", "alice")], &[], None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Missing required fields.");
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let app = TestApp::new();

    let response = app.signup("alice", "pw123", "Alice A").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Signup successful! Please log in.");

    let response = app.signup("alice", "other", "Alice Again").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Username already exists.");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new();
    app.signup("alice", "pw123", "Alice A").await;

    let response = app
        .post_json(
            "/api/login",
            &json!({ "username": "alice", "password": "wrong" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Invalid username or password.");

    // Unknown user gets the same response as a wrong password
    let response = app
        .post_json(
            "/api/login",
            &json!({ "username": "nobody", "password": "pw123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_session() {
    let app = TestApp::new();

    let response = app.get("/api/profile", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Authentication required.");
}

#[tokio::test]
async fn test_login_establishes_session() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    let response = app.get("/api/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["fullname"], "Alice A");
    assert_eq!(body["rating"], 0.0);
    assert_eq!(body["ratingCount"], 0);
    // Credentials never leave the server
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    let response = app
        .post_json("/api/logout", &json!({}), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_replaces_all_fields() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    let response = app
        .post_json(
            "/api/profile",
            &json!({
                "fullname": "Alice Artisan",
                "shopname": "Clayworks",
                "address": "12 Kiln Lane",
                "story": "Hand-thrown pottery.",
                "contactNumber": "555-0101"
            }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Profile updated successfully.");

    let body = json_body(app.get("/api/profile", Some(&cookie)).await).await;
    assert_eq!(body["fullname"], "Alice Artisan");
    assert_eq!(body["shopname"], "Clayworks");
    assert_eq!(body["contactNumber"], "555-0101");

    // An omitted field is overwritten with an empty value, not kept
    let response = app
        .post_json(
            "/api/profile",
            &json!({ "fullname": "Alice Artisan" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/profile", Some(&cookie)).await).await;
    assert_eq!(body["fullname"], "Alice Artisan");
    assert_eq!(body["shopname"], "");
    assert_eq!(body["contactNumber"], "");
}

#[tokio::test]
async fn test_artisan_directory_lists_accounts() {
    let app = TestApp::new();
    app.signup("alice", "pw123", "Alice A").await;
    app.signup("bob", "pw456", "Bob B").await;

    let response = app.get("/api/artisans", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let artisans = body.as_array().unwrap();
    assert_eq!(artisans.len(), 2);
    for artisan in artisans {
        assert!(artisan.get("passwordHash").is_none());
    }
}
