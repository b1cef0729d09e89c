/// Integration tests for subjects
///
/// This file covers subject CRUD, per-user name uniqueness, the
/// soft-or-hard delete policy, and the analytics rollup.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

/// Subject names are unique per user, not globally
#[tokio::test]
async fn test_subject_name_unique_per_user() {
    let mut app = create_test_app();
    let meg_cookie = register_user(&mut app, "meg").await;
    let calvin_cookie = register_user(&mut app, "calvin").await;

    create_subject(&mut app, &meg_cookie, "Math").await;

    let response = send(
        &mut app,
        "POST",
        "/api/subjects",
        Some(&meg_cookie),
        Some(json!({ "name": "Math" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Subject name already exists");

    // A different user can use the same name
    let response = send(
        &mut app,
        "POST",
        "/api/subjects",
        Some(&calvin_cookie),
        Some(json!({ "name": "Math" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Deleting an unused subject removes it; one with assignments is
/// deactivated instead
#[tokio::test]
async fn test_delete_policy_depends_on_assignments() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    // Unused subject: hard delete
    let unused = create_subject(&mut app, &cookie, "Latin").await;
    let unused_id = unused["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "DELETE",
        &format!("/api/subjects/{unused_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Subject deleted successfully");

    let response = send(
        &mut app,
        "GET",
        &format!("/api/subjects/{unused_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Subject with an assignment: soft delete
    let used = create_subject(&mut app, &cookie, "Math").await;
    let used_id = used["id"].as_str().unwrap().to_string();
    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "POST",
        "/api/assignments",
        Some(&cookie),
        Some(json!({ "student_id": student_id, "subject_id": used_id, "title": "Fractions" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &mut app,
        "DELETE",
        &format!("/api/subjects/{used_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Subject deactivated successfully (has existing assignments)"
    );

    // Still reachable by ID, just inactive
    let response = send(
        &mut app,
        "GET",
        &format!("/api/subjects/{used_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["active"], false);
}

/// Analytics aggregate grades and statuses over the subject's assignments
#[tokio::test]
async fn test_subject_analytics() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let subject = create_subject(&mut app, &cookie, "Math").await;
    let subject_id = subject["id"].as_str().unwrap().to_string();
    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    // Two assignments in the subject, one graded at 90, one left open
    for title in ["Fractions", "Decimals"] {
        let response = send(
            &mut app,
            "POST",
            "/api/assignments",
            Some(&cookie),
            Some(json!({ "student_id": student_id, "subject_id": subject_id, "title": title })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(
        &mut app,
        "GET",
        &format!("/api/subjects/{subject_id}/assignments"),
        Some(&cookie),
        None,
    )
    .await;
    let assignments = body_json(response).await;
    let first_id = assignments[0]["id"].as_str().unwrap().to_string();

    send(
        &mut app,
        "POST",
        &format!("/api/assignments/{first_id}/grade"),
        Some(&cookie),
        Some(json!({ "points_earned": 90 })),
    )
    .await;

    let response = send(
        &mut app,
        "GET",
        &format!("/api/subjects/{subject_id}/analytics"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["total_assignments"], 2);
    assert_eq!(body["graded_assignments"], 1);
    assert_eq!(body["average_grade"], 90.0);
    assert_eq!(body["grade_distribution"]["A-"], 1);
    assert_eq!(body["status_distribution"]["graded"], 1);
    assert_eq!(body["status_distribution"]["assigned"], 1);
    assert_eq!(body["completion_rate"], 50.0);

    // The subject view carries the same aggregates
    assert_eq!(body["subject"]["assignment_count"], 2);
    assert_eq!(body["subject"]["average_grade"], 90.0);
}

/// Subjects are invisible across users
#[tokio::test]
async fn test_subject_ownership() {
    let mut app = create_test_app();
    let meg_cookie = register_user(&mut app, "meg").await;
    let calvin_cookie = register_user(&mut app, "calvin").await;

    let subject = create_subject(&mut app, &meg_cookie, "Math").await;
    let subject_id = subject["id"].as_str().unwrap();

    let response = send(
        &mut app,
        "GET",
        &format!("/api/subjects/{subject_id}"),
        Some(&calvin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
