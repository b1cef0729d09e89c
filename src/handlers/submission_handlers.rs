use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::CreateSubmissionDto;
use crate::errors::ApiError;
use crate::models::{AssignmentStatus, Submission};
use crate::repo;
use crate::views::SubmissionView;

/// Handler for listing an assignment's submissions
///
/// This function handles GET requests to `/assignments/{id}/submissions`,
/// newest first.
#[instrument(skip(pool, user), fields(assignment_id = %assignment_id))]
pub async fn list_submissions_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<Vec<SubmissionView>>, ApiError> {
    debug!("Listing submissions");

    repo::get_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let submissions =
        repo::list_submissions(&pool, &user.id(), &assignment_id).map_err(ApiError::Database)?;

    Ok(Json(
        submissions.iter().map(SubmissionView::from_submission).collect(),
    ))
}

/// Handler for recording a submission
///
/// This function handles POST requests to `/assignments/{id}/submissions`.
/// The body carries file metadata only; the file itself is expected to
/// already sit at `file_path`. An assignment still in the open states
/// moves to `submitted`.
#[instrument(skip(pool, user, payload), fields(assignment_id = %assignment_id))]
pub async fn create_submission_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(assignment_id): Path<String>,
    Json(payload): Json<CreateSubmissionDto>,
) -> Result<(StatusCode, Json<SubmissionView>), ApiError> {
    info!("Recording submission");

    let assignment = repo::get_assignment(&pool, &user.id(), &assignment_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let submission = repo::create_submission(
        &pool,
        Submission::new(
            assignment_id.clone(),
            payload.file_path,
            payload.file_name,
            payload.file_size,
            payload.mime_type,
            payload.notes,
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    if !assignment.get_status().is_closed() {
        repo::set_assignment_status(
            &pool,
            &user.id(),
            &assignment_id,
            AssignmentStatus::Submitted,
        )
        .await
        .map_err(ApiError::Database)?;
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmissionView::from_submission(&submission)),
    ))
}
