use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Submission;
use crate::schema::{assignments, students, submissions};
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed submission row.
///
/// Ownership of the target assignment is verified by the handler.
#[instrument(skip(pool, new_submission), fields(assignment_id = %new_submission.get_assignment_id()))]
pub async fn create_submission(pool: &DbPool, new_submission: Submission) -> Result<Submission> {
    debug!("Recording submission");

    let mut conn = pool.get()?;

    diesel::insert_into(submissions::table)
        .values(new_submission.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully recorded submission with id: {}", new_submission.get_id());

    Ok(new_submission)
}

/// All submissions for one of the user's assignments, newest first
#[instrument(skip(pool), fields(assignment_id = %assignment_id))]
pub fn list_submissions(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
) -> Result<Vec<Submission>> {
    let conn = &mut pool.get()?;

    let result = submissions::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(submissions::assignment_id.eq(assignment_id))
        .order(submissions::submitted_at.desc())
        .select(Submission::as_select())
        .load::<Submission>(conn)?;

    Ok(result)
}

/// Whether one of the user's assignments has any submissions
pub fn has_submissions(pool: &DbPool, user_id: &str, assignment_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let count: i64 = submissions::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(submissions::assignment_id.eq(assignment_id))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}
