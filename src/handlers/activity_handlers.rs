use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{parse_date_option, require_field, AddAchievementDto, CreateActivityDto, UpdateActivityDto};
use crate::errors::ApiError;
use crate::models::Activity;
use crate::repo;
use crate::views::{ActivityView, MessageResponse};

/// Handler for listing a student's activities
///
/// This function handles GET requests to `/students/{id}/activities`.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn list_activities_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<ActivityView>>, ApiError> {
    debug!("Listing activities");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let activities =
        repo::list_activities(&pool, &user.id(), &student_id).map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(
        activities
            .iter()
            .map(|a| ActivityView::from_parts(a, today))
            .collect(),
    ))
}

/// Handler for creating an activity
///
/// This function handles POST requests to `/students/{id}/activities`.
#[instrument(skip(pool, user, payload), fields(student_id = %student_id))]
pub async fn create_activity_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Json(payload): Json<CreateActivityDto>,
) -> Result<(StatusCode, Json<ActivityView>), ApiError> {
    info!("Creating new activity");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let name = require_field(payload.name, "name")?;
    let start_date = parse_date_option(payload.start_date.as_deref())?;
    let end_date = parse_date_option(payload.end_date.as_deref())?;

    let activity = repo::create_activity(
        &pool,
        Activity::new(
            student_id,
            name,
            payload.description,
            payload.activity_type,
            start_date,
            end_date,
            payload.hours_total,
            payload.notes,
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok((
        StatusCode::CREATED,
        Json(ActivityView::from_parts(&activity, today)),
    ))
}

/// Handler for updating an activity
///
/// This function handles PUT requests to `/activities/{id}`. Only fields
/// present in the payload are changed.
#[instrument(skip(pool, user, payload), fields(activity_id = %activity_id))]
pub async fn update_activity_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(activity_id): Path<String>,
    Json(payload): Json<UpdateActivityDto>,
) -> Result<Json<ActivityView>, ApiError> {
    debug!("Updating activity");

    repo::get_activity(&pool, &user.id(), &activity_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let start_date = parse_date_option(payload.start_date.as_deref())?;
    let end_date = parse_date_option(payload.end_date.as_deref())?;

    let updated = repo::update_activity(
        &pool,
        &user.id(),
        &activity_id,
        payload.name,
        payload.description,
        payload.activity_type,
        start_date,
        end_date,
        payload.hours_total,
        payload.notes,
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(ActivityView::from_parts(&updated, today)))
}

/// Handler for recording an achievement on an activity
///
/// This function handles POST requests to `/activities/{id}/achievements`.
/// The achievement is stamped with the current day.
#[instrument(skip(pool, user, payload), fields(activity_id = %activity_id))]
pub async fn add_achievement_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(activity_id): Path<String>,
    Json(payload): Json<AddAchievementDto>,
) -> Result<Json<ActivityView>, ApiError> {
    info!("Recording achievement");

    repo::get_activity(&pool, &user.id(), &activity_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let title = require_field(payload.title, "title")?;
    let today = Utc::now().date_naive();

    let updated = repo::add_achievement(&pool, &user.id(), &activity_id, title, today)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(ActivityView::from_parts(&updated, today)))
}

/// Handler for deleting an activity
///
/// This function handles DELETE requests to `/activities/{id}`.
#[instrument(skip(pool, user), fields(activity_id = %activity_id))]
pub async fn delete_activity_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(activity_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting activity {}", activity_id);

    repo::get_activity(&pool, &user.id(), &activity_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_activity(&pool, &user.id(), &activity_id)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Activity deleted successfully")))
}
