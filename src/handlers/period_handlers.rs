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
use crate::dto::{parse_date, parse_date_option, require_field, CreatePeriodDto, UpdatePeriodDto};
use crate::errors::ApiError;
use crate::models::AcademicPeriod;
use crate::repo;
use crate::views::{MessageResponse, PeriodView};

/// Handler for listing the user's academic periods
///
/// This function handles GET requests to `/periods`, earliest first.
#[instrument(skip(pool, user))]
pub async fn list_periods_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
) -> Result<Json<Vec<PeriodView>>, ApiError> {
    debug!("Listing academic periods");

    let periods = repo::list_periods(&pool, &user.id()).map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(
        periods.iter().map(|p| PeriodView::from_parts(p, today)).collect(),
    ))
}

/// Handler for creating an academic period
///
/// This function handles POST requests to `/periods`. The range is
/// inclusive and must be ordered.
#[instrument(skip(pool, user, payload))]
pub async fn create_period_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<CreatePeriodDto>,
) -> Result<(StatusCode, Json<PeriodView>), ApiError> {
    info!("Creating new academic period");

    let name = require_field(payload.name, "name")?;
    let start_date = parse_date(&require_field(payload.start_date, "start_date")?)?;
    let end_date = parse_date(&require_field(payload.end_date, "end_date")?)?;

    if end_date < start_date {
        return Err(ApiError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }

    let period = repo::create_period(
        &pool,
        AcademicPeriod::new(
            user.id(),
            name,
            start_date,
            end_date,
            payload.period_type.unwrap_or_else(|| "semester".to_string()),
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok((
        StatusCode::CREATED,
        Json(PeriodView::from_parts(&period, today)),
    ))
}

/// Handler for retrieving a specific academic period
///
/// This function handles GET requests to `/periods/{id}`.
#[instrument(skip(pool, user), fields(period_id = %period_id))]
pub async fn get_period_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(period_id): Path<String>,
) -> Result<Json<PeriodView>, ApiError> {
    let period = repo::get_period(&pool, &user.id(), &period_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let today = Utc::now().date_naive();
    Ok(Json(PeriodView::from_parts(&period, today)))
}

/// Handler for updating an academic period
///
/// This function handles PUT requests to `/periods/{id}`. The resulting
/// range (after merging payload and stored dates) must stay ordered.
#[instrument(skip(pool, user, payload), fields(period_id = %period_id))]
pub async fn update_period_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(period_id): Path<String>,
    Json(payload): Json<UpdatePeriodDto>,
) -> Result<Json<PeriodView>, ApiError> {
    debug!("Updating academic period");

    let period = repo::get_period(&pool, &user.id(), &period_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let start_date = parse_date_option(payload.start_date.as_deref())?;
    let end_date = parse_date_option(payload.end_date.as_deref())?;

    let effective_start = start_date.unwrap_or_else(|| period.get_start_date());
    let effective_end = end_date.unwrap_or_else(|| period.get_end_date());
    if effective_end < effective_start {
        return Err(ApiError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }

    let updated = repo::update_period(
        &pool,
        &user.id(),
        &period_id,
        payload.name,
        start_date,
        end_date,
        payload.period_type,
        payload.active,
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(PeriodView::from_parts(&updated, today)))
}

/// Handler for deleting an academic period
///
/// This function handles DELETE requests to `/periods/{id}`.
#[instrument(skip(pool, user), fields(period_id = %period_id))]
pub async fn delete_period_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(period_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting academic period {}", period_id);

    repo::get_period(&pool, &user.id(), &period_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_period(&pool, &user.id(), &period_id)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Academic period deleted successfully")))
}
