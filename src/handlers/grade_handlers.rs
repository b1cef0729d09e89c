use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{require_value, GradeAssignmentDto, UpdateGradeDto};
use crate::errors::ApiError;
use crate::models::{Assignment, AssignmentStatus, Grade, RubricScores};
use crate::repo;
use crate::views::{GradeView, GradedResponse, MessageResponse};

use super::assignment_handlers::assignment_view;

fn check_points_range(points_earned: f64, points_total: i32) -> Result<(), ApiError> {
    if points_earned < 0.0 || points_earned > points_total as f64 {
        return Err(ApiError::Validation(format!(
            "Points earned must be between 0 and {points_total}"
        )));
    }
    Ok(())
}

fn owned_assignment(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
) -> Result<Assignment, ApiError> {
    repo::get_assignment(pool, user_id, assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)
}

/// Handler for grading an assignment
///
/// This function handles POST requests to `/assignments/{id}/grade`.
/// Grading an already-graded assignment replaces the existing grade's
/// fields; either way the assignment moves to `graded`.
#[instrument(skip(pool, user, payload), fields(assignment_id = %assignment_id))]
pub async fn grade_assignment_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
    Json(payload): Json<GradeAssignmentDto>,
) -> Result<Json<GradedResponse>, ApiError> {
    info!("Grading assignment");

    let assignment = owned_assignment(&pool, &user.id(), &assignment_id)?;

    let points_earned = require_value(payload.points_earned, "points_earned")?;
    check_points_range(points_earned, assignment.get_points_total())?;

    let existing = repo::get_grade_for_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?;

    let grade = match existing {
        Some(_) => repo::update_grade(
            &pool,
            &user.id(),
            &assignment_id,
            Some(points_earned),
            payload.feedback,
            payload.rubric_scores.map(RubricScores),
            &user.id(),
        )
        .await
        .map_err(ApiError::Database)?,
        None => {
            repo::create_grade(
                &pool,
                Grade::new(
                    assignment_id.clone(),
                    points_earned,
                    payload.feedback,
                    payload.rubric_scores.map(RubricScores),
                    user.id(),
                ),
            )
            .await
            .map_err(ApiError::Database)?
        }
    };

    repo::set_assignment_status(&pool, &user.id(), &assignment_id, AssignmentStatus::Graded)
        .await
        .map_err(ApiError::Database)?;

    let updated = owned_assignment(&pool, &user.id(), &assignment_id)?;
    let today = Utc::now().date_naive();

    info!("Successfully graded assignment {}", assignment_id);

    Ok(Json(GradedResponse {
        message: "Assignment graded successfully".to_string(),
        grade: GradeView::from_parts(&grade, updated.get_points_total()),
        assignment: assignment_view(&pool, &user.id(), &updated, today)?,
    }))
}

/// Handler for retrieving an assignment's grade
///
/// This function handles GET requests to `/assignments/{id}/grade`. An
/// ungraded assignment reads as 404.
#[instrument(skip(pool, user), fields(assignment_id = %assignment_id))]
pub async fn get_grade_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<GradeView>, ApiError> {
    let assignment = owned_assignment(&pool, &user.id(), &assignment_id)?;

    let grade = repo::get_grade_for_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(GradeView::from_parts(
        &grade,
        assignment.get_points_total(),
    )))
}

/// Handler for updating an assignment's grade
///
/// This function handles PUT requests to `/assignments/{id}/grade`. Only
/// fields present in the payload are changed; new points are range-checked
/// against the assignment.
#[instrument(skip(pool, user, payload), fields(assignment_id = %assignment_id))]
pub async fn update_grade_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
    Json(payload): Json<UpdateGradeDto>,
) -> Result<Json<GradeView>, ApiError> {
    debug!("Updating grade");

    let assignment = owned_assignment(&pool, &user.id(), &assignment_id)?;

    repo::get_grade_for_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if let Some(points_earned) = payload.points_earned {
        check_points_range(points_earned, assignment.get_points_total())?;
    }

    let grade = repo::update_grade(
        &pool,
        &user.id(),
        &assignment_id,
        payload.points_earned,
        payload.feedback,
        payload.rubric_scores.map(RubricScores),
        &user.id(),
    )
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(GradeView::from_parts(
        &grade,
        assignment.get_points_total(),
    )))
}

/// Handler for deleting an assignment's grade
///
/// This function handles DELETE requests to `/assignments/{id}/grade`.
/// The assignment falls back to `submitted` when it has submissions,
/// `assigned` otherwise.
#[instrument(skip(pool, user), fields(assignment_id = %assignment_id))]
pub async fn delete_grade_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting grade");

    owned_assignment(&pool, &user.id(), &assignment_id)?;

    repo::get_grade_for_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_grade(&pool, &user.id(), &assignment_id)
        .await
        .map_err(ApiError::Database)?;

    let fallback = if repo::has_submissions(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
    {
        AssignmentStatus::Submitted
    } else {
        AssignmentStatus::Assigned
    };
    repo::set_assignment_status(&pool, &user.id(), &assignment_id, fallback)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Grade deleted successfully")))
}
