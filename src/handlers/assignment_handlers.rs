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
use crate::dto::{
    parse_date_option, require_field, AssignmentFilterQuery, CreateAssignmentDto,
    UpdateAssignmentDto,
};
use crate::errors::ApiError;
use crate::models::{Assignment, AssignmentStatus, StringList};
use crate::repo;
use crate::views::{
    AssignmentCreatedResponse, AssignmentDashboardStats, AssignmentView, AssignmentsDashboardView,
    MessageResponse,
};

/// Assembles the full view of an assignment: row + grade + submissions
pub(crate) fn assignment_view(
    pool: &DbPool,
    user_id: &str,
    assignment: &Assignment,
    today: chrono::NaiveDate,
) -> Result<AssignmentView, ApiError> {
    let grade = repo::get_grade_for_assignment(pool, user_id, &assignment.get_id())
        .map_err(ApiError::Database)?;
    let submissions = repo::list_submissions(pool, user_id, &assignment.get_id())
        .map_err(ApiError::Database)?;

    Ok(AssignmentView::from_parts(
        assignment,
        grade.as_ref(),
        &submissions,
        today,
    ))
}

/// Assembles views for a batch of assignments
pub(crate) fn assignment_views(
    pool: &DbPool,
    user_id: &str,
    assignments: &[Assignment],
    today: chrono::NaiveDate,
) -> Result<Vec<AssignmentView>, ApiError> {
    assignments
        .iter()
        .map(|a| assignment_view(pool, user_id, a, today))
        .collect()
}

/// Handler for listing assignments across the user's students
///
/// This function handles GET requests to `/assignments`, with optional
/// student_id, subject_id, status and limit filters.
#[instrument(skip(pool, user))]
pub async fn list_assignments_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Query(filter): Query<AssignmentFilterQuery>,
) -> Result<Json<Vec<AssignmentView>>, ApiError> {
    debug!("Listing assignments");

    let assignments = repo::list_assignments(
        &pool,
        &user.id(),
        filter.student_id.as_deref(),
        filter.subject_id.as_deref(),
        filter.status.as_deref(),
        filter.limit,
    )
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let views = assignment_views(&pool, &user.id(), &assignments, today)?;

    info!("Retrieved {} assignments", views.len());

    Ok(Json(views))
}

/// Handler for creating a new assignment
///
/// This function handles POST requests to `/assignments`. The target
/// student (and subject, when given) must belong to the caller.
#[instrument(skip(pool, user, payload))]
pub async fn create_assignment_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<AssignmentCreatedResponse>), ApiError> {
    info!("Creating new assignment");

    let student_id = require_field(payload.student_id, "student_id")?;
    let title = require_field(payload.title, "title")?;

    // Not owned reads exactly like not existing
    repo::get_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if let Some(subject_id) = &payload.subject_id {
        repo::get_subject(&pool, &user.id(), subject_id)
            .map_err(ApiError::Database)?
            .ok_or(ApiError::NotFound)?;
    }

    let due_date = parse_date_option(payload.due_date.as_deref())?;

    let assignment = repo::create_assignment(
        &pool,
        Assignment::new(
            student_id,
            payload.subject_id,
            title,
            payload.description,
            payload.instructions,
            due_date,
            payload.estimated_duration,
            payload.points_total.unwrap_or(100),
            payload.assignment_type.unwrap_or_else(|| "homework".to_string()),
            payload.difficulty_level.unwrap_or_else(|| "medium".to_string()),
            payload.priority.unwrap_or_else(|| "normal".to_string()),
            payload.tags.map(StringList),
            payload.resources.map(StringList),
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let view = assignment_view(&pool, &user.id(), &assignment, today)?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentCreatedResponse {
            message: "Assignment created successfully".to_string(),
            assignment: view,
        }),
    ))
}

/// Handler for retrieving a specific assignment
///
/// This function handles GET requests to `/assignments/{id}`.
#[instrument(skip(pool, user), fields(assignment_id = %assignment_id))]
pub async fn get_assignment_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<AssignmentView>, ApiError> {
    let assignment = repo::get_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let today = Utc::now().date_naive();
    let view = assignment_view(&pool, &user.id(), &assignment, today)?;

    Ok(Json(view))
}

/// Handler for updating an assignment
///
/// This function handles PUT requests to `/assignments/{id}`. Only fields
/// present in the payload are changed.
#[instrument(skip(pool, user, payload), fields(assignment_id = %assignment_id))]
pub async fn update_assignment_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
    Json(payload): Json<UpdateAssignmentDto>,
) -> Result<Json<AssignmentView>, ApiError> {
    debug!("Updating assignment");

    repo::get_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    if let Some(status) = &payload.status {
        AssignmentStatus::parse(status)
            .ok_or_else(|| ApiError::Validation(format!("Invalid status: {status}")))?;
    }

    let due_date = parse_date_option(payload.due_date.as_deref())?;

    let updated = repo::update_assignment(
        &pool,
        &user.id(),
        &assignment_id,
        payload.title,
        payload.description,
        payload.instructions,
        due_date,
        payload.estimated_duration,
        payload.points_total,
        payload.assignment_type,
        payload.difficulty_level,
        payload.status,
        payload.priority,
        payload.tags.map(StringList),
        payload.resources.map(StringList),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let view = assignment_view(&pool, &user.id(), &updated, today)?;

    Ok(Json(view))
}

/// Handler for deleting an assignment
///
/// This function handles DELETE requests to `/assignments/{id}`. The
/// grade and submissions go with it.
#[instrument(skip(pool, user), fields(assignment_id = %assignment_id))]
pub async fn delete_assignment_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting assignment {}", assignment_id);

    repo::get_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    repo::delete_assignment(&pool, &user.id(), &assignment_id).map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Assignment deleted successfully")))
}

/// Handler for the assignments dashboard
///
/// This function handles GET requests to `/assignments/dashboard`:
/// overdue work, work due in the next seven days, submissions waiting for
/// a grade, and the latest activity.
#[instrument(skip(pool, user))]
pub async fn assignments_dashboard_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
) -> Result<Json<AssignmentsDashboardView>, ApiError> {
    debug!("Building assignments dashboard");

    let today = Utc::now().date_naive();

    let overdue = repo::list_overdue_assignments(&pool, &user.id(), today)
        .map_err(ApiError::Database)?;
    let due_soon = repo::list_assignments_due_soon(&pool, &user.id(), today, 7)
        .map_err(ApiError::Database)?;
    let need_grading =
        repo::list_assignments_needing_grading(&pool, &user.id()).map_err(ApiError::Database)?;
    let recent =
        repo::list_recent_assignments(&pool, &user.id(), 10).map_err(ApiError::Database)?;
    let total = repo::count_assignments(&pool, &user.id()).map_err(ApiError::Database)?;

    let stats = AssignmentDashboardStats {
        total_assignments: total as usize,
        overdue_count: overdue.len(),
        due_soon_count: due_soon.len(),
        need_grading_count: need_grading.len(),
    };

    Ok(Json(AssignmentsDashboardView {
        overdue_assignments: assignment_views(&pool, &user.id(), &overdue, today)?,
        due_soon: assignment_views(&pool, &user.id(), &due_soon, today)?,
        need_grading: assignment_views(&pool, &user.id(), &need_grading, today)?,
        recent_activity: assignment_views(&pool, &user.id(), &recent, today)?,
        stats,
    }))
}
