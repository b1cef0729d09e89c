use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Goal;
use crate::schema::{goals, students};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed goal row
#[instrument(skip(pool, new_goal), fields(title = %new_goal.get_title()))]
pub async fn create_goal(pool: &DbPool, new_goal: Goal) -> Result<Goal> {
    debug!("Creating new goal");

    let mut conn = pool.get()?;

    diesel::insert_into(goals::table)
        .values(new_goal.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created goal with id: {}", new_goal.get_id());

    Ok(new_goal)
}

/// Retrieves one of the user's goals by ID, scoped through the owning
/// student
#[instrument(skip(pool), fields(goal_id = %goal_id))]
pub fn get_goal(pool: &DbPool, user_id: &str, goal_id: &str) -> Result<Option<Goal>> {
    let conn = &mut pool.get()?;

    let result = goals::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(goals::id.eq(goal_id))
        .select(Goal::as_select())
        .first::<Goal>(conn)
        .optional()?;

    Ok(result)
}

/// Lists goals for one of the user's students, optionally filtered by
/// status
#[instrument(skip(pool), fields(student_id = %student_id))]
pub fn list_goals(
    pool: &DbPool,
    user_id: &str,
    student_id: &str,
    status: Option<&str>,
) -> Result<Vec<Goal>> {
    let conn = &mut pool.get()?;

    let mut query = goals::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id.to_string()))
        .filter(goals::student_id.eq(student_id.to_string()))
        .select(Goal::as_select())
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(goals::status.eq(status.to_string()));
    }

    let result = query.order(goals::created_at.asc()).load::<Goal>(conn)?;

    Ok(result)
}

/// Applies a partial update to one of the user's goals.
///
/// The caller is responsible for progress clamping and the auto-complete
/// transition; this function persists exactly what it is given.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(goal_id = %goal_id))]
pub async fn update_goal(
    pool: &DbPool,
    user_id: &str,
    goal_id: &str,
    subject_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    target_date: Option<NaiveDate>,
    goal_type: Option<String>,
    status: Option<String>,
    progress_percentage: Option<i32>,
    notes: Option<String>,
) -> Result<Goal> {
    debug!("Updating goal");

    let _goal = get_goal(pool, user_id, goal_id)?
        .ok_or_else(|| anyhow::anyhow!("Goal with id {} not found", goal_id))?;

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = goals)]
    struct GoalChangeset {
        subject_id: Option<String>,
        title: Option<String>,
        description: Option<String>,
        target_date: Option<NaiveDate>,
        goal_type: Option<String>,
        status: Option<String>,
        progress_percentage: Option<i32>,
        notes: Option<String>,
        updated_at: NaiveDateTime,
    }

    let changeset = GoalChangeset {
        subject_id,
        title,
        description,
        target_date,
        goal_type,
        status,
        progress_percentage,
        notes,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(goals::table.find(goal_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_goal(pool, user_id, goal_id)?
        .ok_or_else(|| anyhow::anyhow!("Goal with id {} not found after update", goal_id))
}

/// Deletes one of the user's goals
#[instrument(skip(pool), fields(goal_id = %goal_id))]
pub async fn delete_goal(pool: &DbPool, user_id: &str, goal_id: &str) -> Result<()> {
    info!("Deleting goal");

    let _goal = get_goal(pool, user_id, goal_id)?
        .ok_or_else(|| anyhow::anyhow!("Goal with id {} not found", goal_id))?;

    let mut conn = pool.get()?;

    diesel::delete(goals::table.find(goal_id.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}
