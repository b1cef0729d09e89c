use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{require_field, AssignmentFilterQuery, CreateSubjectDto, UpdateSubjectDto};
use crate::errors::ApiError;
use crate::metrics;
use crate::models::{DeletePolicy, Subject};
use crate::repo;
use crate::views::{
    AssignmentView, MessageResponse, SubjectAnalyticsView, SubjectCreatedResponse, SubjectView,
};

use super::assignment_handlers::assignment_views;

/// Default display color for new subjects
const DEFAULT_SUBJECT_COLOR: &str = "#2196F3";

/// Assembles the full view of a subject: row + assignment aggregates
pub(crate) fn subject_view(
    pool: &DbPool,
    user_id: &str,
    subject: &Subject,
) -> Result<SubjectView, ApiError> {
    let assignment_count =
        repo::subject_assignment_count(pool, &subject.get_id()).map_err(ApiError::Database)?;

    let points = repo::subject_grade_points(pool, user_id, &subject.get_id())
        .map_err(ApiError::Database)?;
    let percentages: Vec<f64> = points
        .iter()
        .filter_map(|(earned, total)| metrics::grade_percentage(*earned, *total))
        .collect();
    let average_grade = metrics::gpa(&percentages);

    Ok(SubjectView::from_parts(subject, assignment_count, average_grade))
}

fn owned_subject(pool: &DbPool, user_id: &str, subject_id: &str) -> Result<Subject, ApiError> {
    repo::get_subject(pool, user_id, subject_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)
}

/// Handler for listing the user's active subjects
///
/// This function handles GET requests to `/subjects`.
#[instrument(skip(pool, user))]
pub async fn list_subjects_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
) -> Result<Json<Vec<SubjectView>>, ApiError> {
    debug!("Listing subjects");

    let subjects = repo::list_subjects(&pool, &user.id()).map_err(ApiError::Database)?;

    let views = subjects
        .iter()
        .map(|s| subject_view(&pool, &user.id(), s))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(views))
}

/// Handler for creating a new subject
///
/// This function handles POST requests to `/subjects`. Subject names are
/// unique per user.
#[instrument(skip(pool, user, payload))]
pub async fn create_subject_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<CreateSubjectDto>,
) -> Result<(StatusCode, Json<SubjectCreatedResponse>), ApiError> {
    info!("Creating new subject");

    let name = require_field(payload.name, "name")?;

    if repo::subject_name_exists(&pool, &user.id(), &name, None).map_err(ApiError::Database)? {
        return Err(ApiError::Conflict("Subject name already exists".to_string()));
    }

    let subject = repo::create_subject(
        &pool,
        Subject::new(
            user.id(),
            name,
            payload.description,
            Some(
                payload
                    .color
                    .unwrap_or_else(|| DEFAULT_SUBJECT_COLOR.to_string()),
            ),
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let view = subject_view(&pool, &user.id(), &subject)?;

    Ok((
        StatusCode::CREATED,
        Json(SubjectCreatedResponse {
            message: "Subject created successfully".to_string(),
            subject: view,
        }),
    ))
}

/// Handler for retrieving a specific subject
///
/// This function handles GET requests to `/subjects/{id}`.
#[instrument(skip(pool, user), fields(subject_id = %subject_id))]
pub async fn get_subject_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(subject_id): Path<String>,
) -> Result<Json<SubjectView>, ApiError> {
    let subject = owned_subject(&pool, &user.id(), &subject_id)?;

    Ok(Json(subject_view(&pool, &user.id(), &subject)?))
}

/// Handler for updating a subject
///
/// This function handles PUT requests to `/subjects/{id}`. Renames are
/// checked against the per-user uniqueness rule.
#[instrument(skip(pool, user, payload), fields(subject_id = %subject_id))]
pub async fn update_subject_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(subject_id): Path<String>,
    Json(payload): Json<UpdateSubjectDto>,
) -> Result<Json<SubjectView>, ApiError> {
    debug!("Updating subject");

    owned_subject(&pool, &user.id(), &subject_id)?;

    if let Some(name) = &payload.name {
        if repo::subject_name_exists(&pool, &user.id(), name, Some(&subject_id))
            .map_err(ApiError::Database)?
        {
            return Err(ApiError::Conflict("Subject name already exists".to_string()));
        }
    }

    let updated = repo::update_subject(
        &pool,
        &user.id(),
        &subject_id,
        payload.name,
        payload.description,
        payload.color,
        payload.active,
    )
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(subject_view(&pool, &user.id(), &updated)?))
}

/// Handler for deleting a subject
///
/// This function handles DELETE requests to `/subjects/{id}`. A subject
/// with assignments is soft-deleted to keep their history; an unused one
/// is removed outright. The policy choice is explicit here, not inferred
/// downstream.
#[instrument(skip(pool, user), fields(subject_id = %subject_id))]
pub async fn delete_subject_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(subject_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting subject {}", subject_id);

    owned_subject(&pool, &user.id(), &subject_id)?;

    let has_assignments =
        repo::subject_assignment_count(&pool, &subject_id).map_err(ApiError::Database)? > 0;

    let (policy, message) = if has_assignments {
        (
            DeletePolicy::Soft,
            "Subject deactivated successfully (has existing assignments)",
        )
    } else {
        (DeletePolicy::Hard, "Subject deleted successfully")
    };

    repo::delete_subject(&pool, &user.id(), &subject_id, policy)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new(message)))
}

/// Handler for listing a subject's assignments
///
/// This function handles GET requests to `/subjects/{id}/assignments`,
/// with optional student_id, status and limit filters.
#[instrument(skip(pool, user), fields(subject_id = %subject_id))]
pub async fn subject_assignments_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(subject_id): Path<String>,
    Query(filter): Query<AssignmentFilterQuery>,
) -> Result<Json<Vec<AssignmentView>>, ApiError> {
    owned_subject(&pool, &user.id(), &subject_id)?;

    let assignments = repo::list_assignments(
        &pool,
        &user.id(),
        filter.student_id.as_deref(),
        Some(&subject_id),
        filter.status.as_deref(),
        filter.limit,
    )
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(assignment_views(&pool, &user.id(), &assignments, today)?))
}

/// Handler for a subject's analytics
///
/// This function handles GET requests to `/subjects/{id}/analytics`:
/// the grade average, letter and status distributions, and the share of
/// assignments already graded.
#[instrument(skip(pool, user), fields(subject_id = %subject_id))]
pub async fn subject_analytics_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(subject_id): Path<String>,
) -> Result<Json<SubjectAnalyticsView>, ApiError> {
    debug!("Building subject analytics");

    let subject = owned_subject(&pool, &user.id(), &subject_id)?;

    let assignments =
        repo::list_assignments(&pool, &user.id(), None, Some(&subject_id), None, None)
            .map_err(ApiError::Database)?;
    let points = repo::subject_grade_points(&pool, &user.id(), &subject_id)
        .map_err(ApiError::Database)?;

    let percentages: Vec<f64> = points
        .iter()
        .filter_map(|(earned, total)| metrics::grade_percentage(*earned, *total))
        .collect();

    let mut grade_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for percentage in &percentages {
        let letter = metrics::letter_grade(*percentage);
        *grade_distribution.entry(letter.to_string()).or_default() += 1;
    }

    let mut status_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for assignment in &assignments {
        *status_distribution
            .entry(assignment.get_status_raw())
            .or_default() += 1;
    }

    let total_assignments = assignments.len();
    let graded_assignments = points.len();
    let completion_rate = if total_assignments > 0 {
        Some(metrics::round1(
            graded_assignments as f64 / total_assignments as f64 * 100.0,
        ))
    } else {
        None
    };

    Ok(Json(SubjectAnalyticsView {
        subject: subject_view(&pool, &user.id(), &subject)?,
        total_assignments,
        graded_assignments,
        average_grade: metrics::gpa(&percentages),
        grade_distribution,
        status_distribution,
        completion_rate,
    }))
}
