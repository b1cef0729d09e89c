/// Integration tests for assignments and grading
///
/// This file covers assignment CRUD, the grading flow with its derived
/// percentage and letter, grade bounds, submissions, and the dashboard.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

/// The canonical flow: register, create a student, assign work, grade it
/// with 90/100 and read back 90.0% / "A-"
#[tokio::test]
async fn test_grading_flow_derives_percentage_and_letter() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    let assignment = create_assignment(&mut app, &cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();
    // points_total defaults to 100
    assert_eq!(assignment["points_total"], 100);
    assert_eq!(assignment["status"], "assigned");
    assert_eq!(assignment["is_graded"], false);

    let response = send(
        &mut app,
        "POST",
        &format!("/api/assignments/{assignment_id}/grade"),
        Some(&cookie),
        Some(json!({ "points_earned": 90 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["grade"]["percentage"], 90.0);
    assert_eq!(body["grade"]["grade_letter"], "A-");
    assert_eq!(body["assignment"]["status"], "graded");
    assert_eq!(body["assignment"]["grade_percentage"], 90.0);
    assert_eq!(body["assignment"]["grade_letter"], "A-");
    assert_eq!(body["assignment"]["is_graded"], true);

    // The student's GPA now reflects the single grade
    let response = send(
        &mut app,
        "GET",
        &format!("/api/students/{student_id}"),
        Some(&cookie),
        None,
    )
    .await;
    let fetched = body_json(response).await;
    assert_eq!(fetched["current_gpa"], 90.0);
}

/// Grade writes outside [0, points_total] are rejected with 400
#[tokio::test]
async fn test_grade_bounds_enforced() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let assignment = create_assignment(&mut app, &cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();
    let grade_uri = format!("/api/assignments/{assignment_id}/grade");

    for points in [-1.0, 101.0] {
        let response = send(
            &mut app,
            "POST",
            &grade_uri,
            Some(&cookie),
            Some(json!({ "points_earned": points })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Points earned must be between 0 and 100");
    }

    // The boundary values are fine
    for points in [0.0, 100.0] {
        let response = send(
            &mut app,
            "POST",
            &grade_uri,
            Some(&cookie),
            Some(json!({ "points_earned": points })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

/// Regrading replaces the grade instead of stacking a second one
#[tokio::test]
async fn test_regrade_replaces_existing_grade() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let assignment = create_assignment(&mut app, &cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();
    let grade_uri = format!("/api/assignments/{assignment_id}/grade");

    let response = send(&mut app, "POST", &grade_uri, Some(&cookie), Some(json!({ "points_earned": 70 }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&mut app, "POST", &grade_uri, Some(&cookie), Some(json!({ "points_earned": 95 }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&mut app, "GET", &grade_uri, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["points_earned"], 95.0);
    assert_eq!(body["percentage"], 95.0);
    assert_eq!(body["grade_letter"], "A");
}

/// Deleting the grade reverts the assignment's status
#[tokio::test]
async fn test_delete_grade_reverts_status() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let assignment = create_assignment(&mut app, &cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    let grade_uri = format!("/api/assignments/{assignment_id}/grade");
    send(&mut app, "POST", &grade_uri, Some(&cookie), Some(json!({ "points_earned": 90 }))).await;

    let response = send(&mut app, "DELETE", &grade_uri, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No submissions, so it falls back to assigned
    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments/{assignment_id}"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "assigned");
    assert_eq!(body["is_graded"], false);

    // The grade itself is gone
    let response = send(&mut app, "GET", &grade_uri, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Recording a submission moves open work to submitted; deleting the grade
/// then falls back to submitted
#[tokio::test]
async fn test_submission_transitions() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let assignment = create_assignment(&mut app, &cookie, &student_id, "Essay").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "POST",
        &format!("/api/assignments/{assignment_id}/submissions"),
        Some(&cookie),
        Some(json!({
            "file_name": "essay.pdf",
            "file_path": "/uploads/essay.pdf",
            "file_size": 120000,
            "mime_type": "application/pdf",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission = body_json(response).await;
    assert_eq!(submission["file_extension"], ".pdf");
    assert_eq!(submission["is_document"], true);
    assert_eq!(submission["is_image"], false);
    // The recorded path doesn't exist on this disk
    assert_eq!(submission["file_exists"], false);

    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments/{assignment_id}"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["submission_count"], 1);
    assert_eq!(body["latest_submission"]["file_name"], "essay.pdf");

    // Grade it, delete the grade: falls back to submitted, not assigned
    let grade_uri = format!("/api/assignments/{assignment_id}/grade");
    send(&mut app, "POST", &grade_uri, Some(&cookie), Some(json!({ "points_earned": 80 }))).await;
    send(&mut app, "DELETE", &grade_uri, Some(&cookie), None).await;

    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments/{assignment_id}"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "submitted");
}

/// Assignments for foreign students can't be created or read
#[tokio::test]
async fn test_assignment_ownership() {
    let mut app = create_test_app();
    let meg_cookie = register_user(&mut app, "meg").await;
    let calvin_cookie = register_user(&mut app, "calvin").await;

    let student = create_student(&mut app, &meg_cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    // Creating against someone else's student reads as not-found
    let response = send(
        &mut app,
        "POST",
        "/api/assignments",
        Some(&calvin_cookie),
        Some(json!({ "student_id": student_id, "title": "Hijack" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let assignment = create_assignment(&mut app, &meg_cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments/{assignment_id}"),
        Some(&calvin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &mut app,
        "POST",
        &format!("/api/assignments/{assignment_id}/grade"),
        Some(&calvin_cookie),
        Some(json!({ "points_earned": 0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// The dashboard buckets work into overdue, due-soon and needs-grading
#[tokio::test]
async fn test_assignments_dashboard() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();

    // One far in the past, one tomorrow, one submitted
    let response = send(
        &mut app,
        "POST",
        "/api/assignments",
        Some(&cookie),
        Some(json!({ "student_id": student_id, "title": "Late", "due_date": "2020-01-01" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let tomorrow = (chrono::Utc::now().date_naive() + chrono::Days::new(1))
        .format("%Y-%m-%d")
        .to_string();
    let response = send(
        &mut app,
        "POST",
        "/api/assignments",
        Some(&cookie),
        Some(json!({ "student_id": student_id, "title": "Soon", "due_date": tomorrow })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let submitted = create_assignment(&mut app, &cookie, &student_id, "Waiting").await;
    let submitted_id = submitted["id"].as_str().unwrap().to_string();
    send(
        &mut app,
        "POST",
        &format!("/api/assignments/{submitted_id}/submissions"),
        Some(&cookie),
        Some(json!({ "file_name": "work.txt" })),
    )
    .await;

    let response = send(&mut app, "GET", "/api/assignments/dashboard", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["stats"]["total_assignments"], 3);
    assert_eq!(body["stats"]["overdue_count"], 1);
    assert_eq!(body["overdue_assignments"][0]["title"], "Late");
    assert_eq!(body["overdue_assignments"][0]["is_overdue"], true);
    assert_eq!(body["stats"]["due_soon_count"], 1);
    assert_eq!(body["due_soon"][0]["title"], "Soon");
    assert_eq!(body["stats"]["need_grading_count"], 1);
    assert_eq!(body["need_grading"][0]["title"], "Waiting");
}

/// Listing filters by student, subject and status
#[tokio::test]
async fn test_assignment_filters() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let subject = create_subject(&mut app, &cookie, "Math").await;
    let subject_id = subject["id"].as_str().unwrap().to_string();

    let response = send(
        &mut app,
        "POST",
        "/api/assignments",
        Some(&cookie),
        Some(json!({ "student_id": student_id, "subject_id": subject_id, "title": "Fractions" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    create_assignment(&mut app, &cookie, &student_id, "Untagged").await;

    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments?subject_id={subject_id}"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Fractions");

    let response = send(
        &mut app,
        "GET",
        &format!("/api/students/{student_id}/assignments?status=assigned"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = send(&mut app, "GET", "/api/assignments?limit=1", Some(&cookie), None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

/// Deleting an assignment removes its grade and submissions with it
#[tokio::test]
async fn test_delete_assignment_cascades() {
    let mut app = create_test_app();
    let cookie = register_user(&mut app, "meg").await;

    let student = create_student(&mut app, &cookie, "Charles", "2010-01-01", "5").await;
    let student_id = student["id"].as_str().unwrap().to_string();
    let assignment = create_assignment(&mut app, &cookie, &student_id, "Math homework").await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    send(
        &mut app,
        "POST",
        &format!("/api/assignments/{assignment_id}/grade"),
        Some(&cookie),
        Some(json!({ "points_earned": 90 })),
    )
    .await;

    let response = send(
        &mut app,
        "DELETE",
        &format!("/api/assignments/{assignment_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &mut app,
        "GET",
        &format!("/api/assignments/{assignment_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The student's grade history is empty again
    let response = send(
        &mut app,
        "GET",
        &format!("/api/students/{student_id}/grades"),
        Some(&cookie),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}
