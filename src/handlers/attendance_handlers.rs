use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{
    parse_date, parse_date_option, require_field, CreateAttendanceDto, DateRangeQuery,
    UpdateAttendanceDto,
};
use crate::errors::ApiError;
use crate::metrics::{self, AttendanceSummary};
use crate::models::{Attendance, AttendanceStatus};
use crate::repo;
use crate::views::{AttendanceView, MessageResponse};

/// Response body for attendance listings: the records plus their summary
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceListResponse {
    pub records: Vec<AttendanceView>,
    pub summary: AttendanceSummary,
}

fn parse_status(value: &str) -> Result<AttendanceStatus, ApiError> {
    AttendanceStatus::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Invalid status: {value}")))
}

/// Handler for listing a student's attendance
///
/// This function handles GET requests to `/students/{id}/attendance`,
/// optionally bounded by start_date/end_date (inclusive), and returns the
/// records together with their aggregate summary.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn list_attendance_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<AttendanceListResponse>, ApiError> {
    debug!("Listing attendance");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let start_date = parse_date_option(range.start_date.as_deref())?;
    let end_date = parse_date_option(range.end_date.as_deref())?;

    let records = repo::list_attendance(&pool, &user.id(), &student_id, start_date, end_date)
        .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let summary = metrics::attendance_summary(&records);

    Ok(Json(AttendanceListResponse {
        records: records
            .iter()
            .map(|r| AttendanceView::from_parts(r, today))
            .collect(),
        summary,
    }))
}

/// Handler for recording one day of attendance
///
/// This function handles POST requests to `/students/{id}/attendance`.
/// One record per student per day; a second write for the same day is a
/// 400.
#[instrument(skip(pool, user, payload), fields(student_id = %student_id))]
pub async fn create_attendance_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Json(payload): Json<CreateAttendanceDto>,
) -> Result<(StatusCode, Json<AttendanceView>), ApiError> {
    info!("Recording attendance");

    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let date = parse_date(&require_field(payload.date, "date")?)?;
    let status = match &payload.status {
        Some(value) => parse_status(value)?,
        None => AttendanceStatus::Present,
    };

    if repo::attendance_exists_for_date(&pool, &user.id(), &student_id, date, None)
        .map_err(ApiError::Database)?
    {
        return Err(ApiError::Conflict(
            "Attendance already recorded for this date".to_string(),
        ));
    }

    let record = repo::create_attendance(
        &pool,
        Attendance::new(
            student_id,
            date,
            status,
            payload.hours.unwrap_or(0.0),
            payload.notes,
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();

    Ok((
        StatusCode::CREATED,
        Json(AttendanceView::from_parts(&record, today)),
    ))
}

/// Handler for updating an attendance record
///
/// This function handles PUT requests to `/attendance/{id}`. Moving a
/// record to another day re-checks the one-per-day rule.
#[instrument(skip(pool, user, payload), fields(attendance_id = %attendance_id))]
pub async fn update_attendance_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(attendance_id): Path<String>,
    Json(payload): Json<UpdateAttendanceDto>,
) -> Result<Json<AttendanceView>, ApiError> {
    debug!("Updating attendance");

    let record = repo::get_attendance(&pool, &user.id(), &attendance_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let date = parse_date_option(payload.date.as_deref())?;
    if let Some(new_date) = date {
        if repo::attendance_exists_for_date(
            &pool,
            &user.id(),
            &record.get_student_id(),
            new_date,
            Some(&attendance_id),
        )
        .map_err(ApiError::Database)?
        {
            return Err(ApiError::Conflict(
                "Attendance already recorded for this date".to_string(),
            ));
        }
    }

    let status = match &payload.status {
        Some(value) => Some(parse_status(value)?.as_str().to_string()),
        None => None,
    };

    let updated = repo::update_attendance(
        &pool,
        &user.id(),
        &attendance_id,
        date,
        status,
        payload.hours,
        payload.notes,
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(AttendanceView::from_parts(&updated, today)))
}

/// Handler for deleting an attendance record
///
/// This function handles DELETE requests to `/attendance/{id}`.
#[instrument(skip(pool, user), fields(attendance_id = %attendance_id))]
pub async fn delete_attendance_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(attendance_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting attendance record {}", attendance_id);

    repo::get_attendance(&pool, &user.id(), &attendance_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_attendance(&pool, &user.id(), &attendance_id)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new(
        "Attendance record deleted successfully",
    )))
}
