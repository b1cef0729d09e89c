use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Assignment, AssignmentStatus, StringList};
use crate::schema::{assignments, grades, students, submissions};
use anyhow::Result;
use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Statuses that still count as open work for dashboard windows
fn open_statuses() -> Vec<String> {
    vec![
        AssignmentStatus::Assigned.as_str().to_string(),
        AssignmentStatus::InProgress.as_str().to_string(),
    ]
}

/// Inserts a fully-constructed assignment row.
///
/// Ownership of the target student (and optional subject) is verified by
/// the handler before construction.
#[instrument(skip(pool, new_assignment), fields(title = %new_assignment.get_title()))]
pub async fn create_assignment(pool: &DbPool, new_assignment: Assignment) -> Result<Assignment> {
    debug!("Creating new assignment");

    let mut conn = pool.get()?;

    diesel::insert_into(assignments::table)
        .values(new_assignment.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created assignment with id: {}", new_assignment.get_id());

    Ok(new_assignment)
}

/// Retrieves one of the user's assignments by ID, scoped through the
/// owning student
#[instrument(skip(pool), fields(assignment_id = %assignment_id))]
pub fn get_assignment(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
) -> Result<Option<Assignment>> {
    let conn = &mut pool.get()?;

    let result = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(assignments::id.eq(assignment_id))
        .select(Assignment::as_select())
        .first::<Assignment>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the user's assignments with optional filters, newest due first
#[instrument(skip(pool))]
pub fn list_assignments(
    pool: &DbPool,
    user_id: &str,
    student_id: Option<&str>,
    subject_id: Option<&str>,
    status: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Assignment>> {
    let conn = &mut pool.get()?;

    let mut query = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id.to_string()))
        .select(Assignment::as_select())
        .into_boxed();

    if let Some(student_id) = student_id {
        query = query.filter(assignments::student_id.eq(student_id.to_string()));
    }
    if let Some(subject_id) = subject_id {
        query = query.filter(assignments::subject_id.eq(subject_id.to_string()));
    }
    if let Some(status) = status {
        query = query.filter(assignments::status.eq(status.to_string()));
    }

    query = query.order(assignments::due_date.desc());

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let result = query.load::<Assignment>(conn)?;

    Ok(result)
}

/// Total number of assignments across the user's students
pub fn count_assignments(pool: &DbPool, user_id: &str) -> Result<i64> {
    let conn = &mut pool.get()?;

    let count: i64 = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .count()
        .get_result(conn)?;

    Ok(count)
}

/// Applies a partial update to one of the user's assignments
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(assignment_id = %assignment_id))]
pub async fn update_assignment(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
    title: Option<String>,
    description: Option<String>,
    instructions: Option<String>,
    due_date: Option<NaiveDate>,
    estimated_duration: Option<i32>,
    points_total: Option<i32>,
    assignment_type: Option<String>,
    difficulty_level: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    tags: Option<StringList>,
    resources: Option<StringList>,
) -> Result<Assignment> {
    debug!("Updating assignment");

    let _assignment = get_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Assignment with id {} not found", assignment_id))?;

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = assignments)]
    struct AssignmentChangeset {
        title: Option<String>,
        description: Option<String>,
        instructions: Option<String>,
        due_date: Option<NaiveDate>,
        estimated_duration: Option<i32>,
        points_total: Option<i32>,
        assignment_type: Option<String>,
        difficulty_level: Option<String>,
        status: Option<String>,
        priority: Option<String>,
        tags: Option<StringList>,
        resources: Option<StringList>,
        updated_at: NaiveDateTime,
    }

    let changeset = AssignmentChangeset {
        title,
        description,
        instructions,
        due_date,
        estimated_duration,
        points_total,
        assignment_type,
        difficulty_level,
        status,
        priority,
        tags,
        resources,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(assignments::table.find(assignment_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_assignment(pool, user_id, assignment_id)?.ok_or_else(|| {
        anyhow::anyhow!("Assignment with id {} not found after update", assignment_id)
    })
}

/// Moves one of the user's assignments to a new lifecycle status
#[instrument(skip(pool), fields(assignment_id = %assignment_id, status = %status.as_str()))]
pub async fn set_assignment_status(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
    status: AssignmentStatus,
) -> Result<()> {
    let _assignment = get_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Assignment with id {} not found", assignment_id))?;

    let mut conn = pool.get()?;

    diesel::update(assignments::table.find(assignment_id.to_string()))
        .set((
            assignments::status.eq(status.as_str().to_string()),
            assignments::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Deletes one of the user's assignments, cascading to its grade and
/// submissions
#[instrument(skip(pool), fields(assignment_id = %assignment_id))]
pub fn delete_assignment(pool: &DbPool, user_id: &str, assignment_id: &str) -> Result<()> {
    info!("Deleting assignment with dependents");

    let _assignment = get_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Assignment with id {} not found", assignment_id))?;

    let conn = &mut pool.get()?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(grades::table.filter(grades::assignment_id.eq(assignment_id)))
            .execute(conn)?;
        diesel::delete(submissions::table.filter(submissions::assignment_id.eq(assignment_id)))
            .execute(conn)?;
        diesel::delete(assignments::table.find(assignment_id.to_string())).execute(conn)?;
        Ok(())
    })?;

    Ok(())
}

/// Open assignments whose due date has passed
#[instrument(skip(pool))]
pub fn list_overdue_assignments(
    pool: &DbPool,
    user_id: &str,
    today: NaiveDate,
) -> Result<Vec<Assignment>> {
    let conn = &mut pool.get()?;

    let result = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(assignments::due_date.lt(Some(today)))
        .filter(assignments::status.eq_any(open_statuses()))
        .order(assignments::due_date.asc())
        .select(Assignment::as_select())
        .load::<Assignment>(conn)?;

    Ok(result)
}

/// Open assignments due within the next `days` days (today inclusive)
#[instrument(skip(pool))]
pub fn list_assignments_due_soon(
    pool: &DbPool,
    user_id: &str,
    today: NaiveDate,
    days: u64,
) -> Result<Vec<Assignment>> {
    let conn = &mut pool.get()?;

    let horizon = today + Days::new(days);

    let result = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(assignments::due_date.ge(Some(today)))
        .filter(assignments::due_date.le(Some(horizon)))
        .filter(assignments::status.eq_any(open_statuses()))
        .order(assignments::due_date.asc())
        .select(Assignment::as_select())
        .load::<Assignment>(conn)?;

    Ok(result)
}

/// Submitted assignments waiting for a grade
#[instrument(skip(pool))]
pub fn list_assignments_needing_grading(pool: &DbPool, user_id: &str) -> Result<Vec<Assignment>> {
    let conn = &mut pool.get()?;

    let result = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(assignments::status.eq(AssignmentStatus::Submitted.as_str()))
        .order(assignments::updated_at.desc())
        .select(Assignment::as_select())
        .load::<Assignment>(conn)?;

    Ok(result)
}

/// Most recently touched assignments, for the dashboard's activity feed
#[instrument(skip(pool))]
pub fn list_recent_assignments(pool: &DbPool, user_id: &str, limit: i64) -> Result<Vec<Assignment>> {
    let conn = &mut pool.get()?;

    let result = assignments::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .order(assignments::updated_at.desc())
        .limit(limit)
        .select(Assignment::as_select())
        .load::<Assignment>(conn)?;

    Ok(result)
}
