/// Integration tests for authentication
///
/// This file covers registration, login/logout, the current-user routes,
/// and the account-visibility rules.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

/// Registering creates the account, logs it in and returns 201
#[tokio::test]
async fn test_register_and_login() {
    let mut app = create_test_app();

    let response = send(
        &mut app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "testuser",
            "email": "test@example.com",
            "password": "password123",
            "first_name": "Test",
            "last_name": "User",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    assert!(cookie.is_some());
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "testuser");
    // Credentials never leave the server
    assert!(body["user"].get("password_hash").is_none());

    // Login with the registered credentials
    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "testuser", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "testuser");
}

/// Login also accepts the email address as the login name
#[tokio::test]
async fn test_login_with_email() {
    let mut app = create_test_app();
    register_user(&mut app, "meg").await;

    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "meg@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

/// Wrong password and unknown user both read as invalid credentials
#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let mut app = create_test_app();
    register_user(&mut app, "meg").await;

    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "meg", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");

    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Registration validates required fields with field-specific messages
#[tokio::test]
async fn test_register_requires_fields() {
    let mut app = create_test_app();

    let response = send(
        &mut app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "meg",
            "email": "meg@example.com",
            "password": "password123",
            "first_name": "Meg",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "last_name is required");
}

/// Username and email collisions are 400s
#[tokio::test]
async fn test_register_rejects_duplicates() {
    let mut app = create_test_app();
    register_user(&mut app, "meg").await;

    let response = send(
        &mut app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "meg",
            "email": "other@example.com",
            "password": "password123",
            "first_name": "Meg",
            "last_name": "Murry",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Username already exists");

    let response = send(
        &mut app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "other",
            "email": "meg@example.com",
            "password": "password123",
            "first_name": "Meg",
            "last_name": "Murry",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Email already exists");
}

/// Protected routes reject requests without a session
#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let mut app = create_test_app();

    for uri in ["/api/students", "/api/subjects", "/api/assignments", "/api/auth/me"] {
        let response = send(&mut app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authentication required");
    }
}

/// Logout invalidates the session
#[tokio::test]
async fn test_logout_invalidates_session() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let response = send(&mut app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old cookie no longer authenticates
    let response = send(&mut app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// /auth/me returns and updates the current account
#[tokio::test]
async fn test_me_round_trip() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let response = send(&mut app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "meg");
    assert_eq!(body["full_name"], "Test User");

    let response = send(
        &mut app,
        "PUT",
        "/api/auth/me",
        Some(&cookie),
        Some(json!({ "first_name": "Margaret", "timezone": "America/Chicago" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["first_name"], "Margaret");
    assert_eq!(body["timezone"], "America/Chicago");
    // Untouched fields survive the partial update
    assert_eq!(body["last_name"], "User");
}

/// Changing the password requires the current one and a long-enough new one
#[tokio::test]
async fn test_change_password() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let response = send(
        &mut app,
        "POST",
        "/api/auth/change-password",
        Some(&cookie),
        Some(json!({ "current_password": "nope", "new_password": "newpassword" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &mut app,
        "POST",
        "/api/auth/change-password",
        Some(&cookie),
        Some(json!({ "current_password": "password123", "new_password": "short" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &mut app,
        "POST",
        "/api/auth/change-password",
        Some(&cookie),
        Some(json!({ "current_password": "password123", "new_password": "newpassword" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Only the new password logs in now
    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "meg", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &mut app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "meg", "password": "newpassword" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Accounts are visible to themselves only; anyone else gets a 403
#[tokio::test]
async fn test_foreign_account_access_forbidden() {
    let mut app = create_test_app();
    let meg_cookie = register_user(&mut app, "meg").await;
    let calvin_cookie = register_user(&mut app, "calvin").await;

    let response = send(&mut app, "GET", "/api/auth/me", Some(&meg_cookie), None).await;
    let meg_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "GET",
        &format!("/api/users/{meg_id}"),
        Some(&calvin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &mut app,
        "DELETE",
        &format!("/api/users/{meg_id}"),
        Some(&calvin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner can read their own account row
    let response = send(
        &mut app,
        "GET",
        &format!("/api/users/{meg_id}"),
        Some(&meg_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
