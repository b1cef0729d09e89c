use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{parse_date_option, require_field, CreateGoalDto, GoalFilterQuery, UpdateGoalDto};
use crate::errors::ApiError;
use crate::metrics;
use crate::models::{Goal, GoalStatus};
use crate::repo;
use crate::views::{GoalView, MessageResponse};

/// Handler for listing a student's goals
///
/// This function handles GET requests to `/students/{id}/goals`, with an
/// optional status filter.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn list_goals_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Query(filter): Query<GoalFilterQuery>,
) -> Result<Json<Vec<GoalView>>, ApiError> {
    debug!("Listing goals");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let goals = repo::list_goals(&pool, &user.id(), &student_id, filter.status.as_deref())
        .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(
        goals.iter().map(|g| GoalView::from_parts(g, today)).collect(),
    ))
}

/// Handler for creating a goal
///
/// This function handles POST requests to `/students/{id}/goals`.
#[instrument(skip(pool, user, payload), fields(student_id = %student_id))]
pub async fn create_goal_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Json(payload): Json<CreateGoalDto>,
) -> Result<(StatusCode, Json<GoalView>), ApiError> {
    info!("Creating new goal");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if let Some(subject_id) = &payload.subject_id {
        repo::get_subject(&pool, &user.id(), subject_id)
            .map_err(ApiError::Database)?
            .ok_or(ApiError::NotFound)?;
    }

    let title = require_field(payload.title, "title")?;
    let target_date = parse_date_option(payload.target_date.as_deref())?;

    let goal = repo::create_goal(
        &pool,
        Goal::new(
            student_id,
            payload.subject_id,
            title,
            payload.description,
            target_date,
            payload.goal_type.unwrap_or_else(|| "academic".to_string()),
            payload.notes,
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok((StatusCode::CREATED, Json(GoalView::from_parts(&goal, today))))
}

/// Handler for retrieving a specific goal
///
/// This function handles GET requests to `/goals/{id}`.
#[instrument(skip(pool, user), fields(goal_id = %goal_id))]
pub async fn get_goal_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(goal_id): Path<String>,
) -> Result<Json<GoalView>, ApiError> {
    let goal = repo::get_goal(&pool, &user.id(), &goal_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let today = Utc::now().date_naive();
    Ok(Json(GoalView::from_parts(&goal, today)))
}

/// Handler for updating a goal
///
/// This function handles PUT requests to `/goals/{id}`. Progress updates
/// are clamped into [0, 100]; an active goal reaching 100 completes
/// automatically.
#[instrument(skip(pool, user, payload), fields(goal_id = %goal_id))]
pub async fn update_goal_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(goal_id): Path<String>,
    Json(payload): Json<UpdateGoalDto>,
) -> Result<Json<GoalView>, ApiError> {
    debug!("Updating goal");

    let goal = repo::get_goal(&pool, &user.id(), &goal_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if let Some(subject_id) = &payload.subject_id {
        repo::get_subject(&pool, &user.id(), subject_id)
            .map_err(ApiError::Database)?
            .ok_or(ApiError::NotFound)?;
    }

    let base_status = match &payload.status {
        Some(value) => GoalStatus::parse(value)
            .ok_or_else(|| ApiError::Validation(format!("Invalid status: {value}")))?,
        None => goal.get_status(),
    };

    let (progress, status) = match payload.progress_percentage {
        Some(requested) => {
            let (clamped, status) = metrics::apply_goal_progress(requested, base_status);
            (Some(clamped), status)
        }
        None => (None, base_status),
    };

    // Persist the status only when the payload touched it or progress
    // forced a transition
    let status_update = (payload.status.is_some() || progress.is_some())
        .then(|| status.as_str().to_string());

    let target_date = parse_date_option(payload.target_date.as_deref())?;

    let updated = repo::update_goal(
        &pool,
        &user.id(),
        &goal_id,
        payload.subject_id,
        payload.title,
        payload.description,
        target_date,
        payload.goal_type,
        status_update,
        progress,
        payload.notes,
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(GoalView::from_parts(&updated, today)))
}

/// Handler for deleting a goal
///
/// This function handles DELETE requests to `/goals/{id}`.
#[instrument(skip(pool, user), fields(goal_id = %goal_id))]
pub async fn delete_goal_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(goal_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting goal {}", goal_id);

    repo::get_goal(&pool, &user.id(), &goal_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_goal(&pool, &user.id(), &goal_id)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Goal deleted successfully")))
}
