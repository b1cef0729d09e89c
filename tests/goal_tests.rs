/// Integration tests for goals
///
/// This file covers goal CRUD, the progress clamp, and the auto-complete
/// transition at 100%.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

async fn setup_goal(app: &mut axum::Router) -> (String, String, String) {
    let cookie = register_user(app, "meg").await;
    let student = create_student(app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    let response = send(
        app,
        "POST",
        &format!("/api/students/{student_id}/goals"),
        Some(&cookie),
        Some(json!({ "title": "Read 20 books", "goal_type": "academic" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let goal = body_json(response).await;
    let goal_id = goal["id"].as_str().unwrap().to_string();

    (cookie, student_id, goal_id)
}

/// New goals start active with zero progress
#[tokio::test]
async fn test_goal_defaults() {
    let mut app = create_test_app();
    let (cookie, _, goal_id) = setup_goal(&mut app).await;

    let response = send(&mut app, "GET", &format!("/api/goals/{goal_id}"), Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["status"], "active");
    assert_eq!(body["progress_percentage"], 0);
    assert_eq!(body["is_overdue"], false);
}

/// Progress is clamped into [0, 100]
#[tokio::test]
async fn test_progress_clamped() {
    let mut app = create_test_app();
    let (cookie, _, goal_id) = setup_goal(&mut app).await;
    let uri = format!("/api/goals/{goal_id}");

    let response = send(&mut app, "PUT", &uri, Some(&cookie), Some(json!({ "progress_percentage": -30 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["progress_percentage"], 0);
    assert_eq!(body["status"], "active");

    let response = send(&mut app, "PUT", &uri, Some(&cookie), Some(json!({ "progress_percentage": 150 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["progress_percentage"], 100);
}

/// Reaching 100 while active auto-completes the goal
#[tokio::test]
async fn test_full_progress_completes_goal() {
    let mut app = create_test_app();
    let (cookie, student_id, goal_id) = setup_goal(&mut app).await;
    let uri = format!("/api/goals/{goal_id}");

    let response = send(&mut app, "PUT", &uri, Some(&cookie), Some(json!({ "progress_percentage": 55 }))).await;
    let body = body_json(response).await;
    assert_eq!(body["progress_percentage"], 55);
    assert_eq!(body["status"], "active");

    let response = send(&mut app, "PUT", &uri, Some(&cookie), Some(json!({ "progress_percentage": 100 }))).await;
    let body = body_json(response).await;
    assert_eq!(body["progress_percentage"], 100);
    assert_eq!(body["status"], "completed");

    // A completed goal drops out of the active listing
    let response = send(
        &mut app,
        "GET",
        &format!("/api/students/{student_id}/goals?status=active"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

/// A paused goal at 100 stays paused; only active goals auto-complete
#[tokio::test]
async fn test_paused_goal_does_not_autocomplete() {
    let mut app = create_test_app();
    let (cookie, _, goal_id) = setup_goal(&mut app).await;
    let uri = format!("/api/goals/{goal_id}");

    let response = send(
        &mut app,
        "PUT",
        &uri,
        Some(&cookie),
        Some(json!({ "status": "paused", "progress_percentage": 100 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["progress_percentage"], 100);
    assert_eq!(body["status"], "paused");
}

/// Unknown statuses are rejected
#[tokio::test]
async fn test_invalid_status_rejected() {
    let mut app = create_test_app();
    let (cookie, _, goal_id) = setup_goal(&mut app).await;

    let response = send(
        &mut app,
        "PUT",
        &format!("/api/goals/{goal_id}"),
        Some(&cookie),
        Some(json!({ "status": "finished" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Goals are invisible across users
#[tokio::test]
async fn test_goal_ownership() {
    let mut app = create_test_app();
    let (_, _, goal_id) = setup_goal(&mut app).await;
    let other_cookie = register_user(&mut app, "calvin").await;

    let uri = format!("/api/goals/{goal_id}");

    let response = send(&mut app, "GET", &uri, Some(&other_cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &mut app,
        "PUT",
        &uri,
        Some(&other_cookie),
        Some(json!({ "progress_percentage": 100 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
