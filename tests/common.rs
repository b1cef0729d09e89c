/// Common test utilities for Homeroom integration tests
///
/// This file contains shared functions for all integration tests: test
/// application setup against a fresh in-memory database, request plumbing
/// that carries the session cookie, and helpers for creating the usual
/// fixture objects through the API.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use diesel::connection::SimpleConnection;
use homeroom::{create_app, db::init_pool};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

/// Creates a test application backed by a fresh in-memory SQLite database
///
/// Uses a unique shared in-memory database per test: plain ":memory:"
/// would give every pooled connection its own empty database.
pub fn create_test_app() -> Router {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = Arc::new(init_pool(&database_url));

    let conn = &mut pool.get().unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON").unwrap();
    homeroom::run_migrations(conn);

    create_app(pool)
}

/// Sends a request with an optional JSON body and session cookie
pub async fn send(
    app: &mut Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri).method(method);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.call(request).await.unwrap()
}

/// Parses a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extracts the session cookie pair ("homeroom_session=<token>") from a
/// response's Set-Cookie header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?;
    let raw = set_cookie.to_str().ok()?;
    let pair = raw.split(';').next()?;
    pair.starts_with("homeroom_session=").then(|| pair.to_string())
}

/// Registers a user via the API and returns their session cookie
pub async fn register_user(app: &mut Router, username: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
            "first_name": "Test",
            "last_name": "User",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response).expect("registration should set the session cookie")
}

/// Creates a student via the API and returns its JSON view
pub async fn create_student(
    app: &mut Router,
    cookie: &str,
    first_name: &str,
    date_of_birth: &str,
    grade_level: &str,
) -> Value {
    let response = send(
        app,
        "POST",
        "/api/students",
        Some(cookie),
        Some(json!({
            "first_name": first_name,
            "last_name": "Wallace",
            "date_of_birth": date_of_birth,
            "grade_level": grade_level,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["student"].clone()
}

/// Creates an assignment via the API and returns its JSON view
pub async fn create_assignment(app: &mut Router, cookie: &str, student_id: &str, title: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/api/assignments",
        Some(cookie),
        Some(json!({
            "student_id": student_id,
            "title": title,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["assignment"].clone()
}

/// Creates a subject via the API and returns its JSON view
pub async fn create_subject(app: &mut Router, cookie: &str, name: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/api/subjects",
        Some(cookie),
        Some(json!({ "name": name })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["subject"].clone()
}
