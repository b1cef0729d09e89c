use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Achievement, AchievementList, Activity};
use crate::schema::{activities, students};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed activity row
#[instrument(skip(pool, new_activity), fields(name = %new_activity.get_name()))]
pub async fn create_activity(pool: &DbPool, new_activity: Activity) -> Result<Activity> {
    debug!("Creating new activity");

    let mut conn = pool.get()?;

    diesel::insert_into(activities::table)
        .values(new_activity.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created activity with id: {}", new_activity.get_id());

    Ok(new_activity)
}

/// Retrieves one of the user's activities by ID, scoped through the
/// owning student
#[instrument(skip(pool), fields(activity_id = %activity_id))]
pub fn get_activity(pool: &DbPool, user_id: &str, activity_id: &str) -> Result<Option<Activity>> {
    let conn = &mut pool.get()?;

    let result = activities::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(activities::id.eq(activity_id))
        .select(Activity::as_select())
        .first::<Activity>(conn)
        .optional()?;

    Ok(result)
}

/// Lists activities for one of the user's students
#[instrument(skip(pool), fields(student_id = %student_id))]
pub fn list_activities(pool: &DbPool, user_id: &str, student_id: &str) -> Result<Vec<Activity>> {
    let conn = &mut pool.get()?;

    let result = activities::table
        .inner_join(students::table)
        .filter(students::user_id.eq(user_id))
        .filter(activities::student_id.eq(student_id))
        .order(activities::created_at.asc())
        .select(Activity::as_select())
        .load::<Activity>(conn)?;

    Ok(result)
}

/// Applies a partial update to one of the user's activities
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(activity_id = %activity_id))]
pub async fn update_activity(
    pool: &DbPool,
    user_id: &str,
    activity_id: &str,
    name: Option<String>,
    description: Option<String>,
    activity_type: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    hours_total: Option<f64>,
    notes: Option<String>,
) -> Result<Activity> {
    debug!("Updating activity");

    let _activity = get_activity(pool, user_id, activity_id)?
        .ok_or_else(|| anyhow::anyhow!("Activity with id {} not found", activity_id))?;

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = activities)]
    struct ActivityChangeset {
        name: Option<String>,
        description: Option<String>,
        activity_type: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        hours_total: Option<f64>,
        notes: Option<String>,
        updated_at: NaiveDateTime,
    }

    let changeset = ActivityChangeset {
        name,
        description,
        activity_type,
        start_date,
        end_date,
        hours_total,
        notes,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(activities::table.find(activity_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_activity(pool, user_id, activity_id)?
        .ok_or_else(|| anyhow::anyhow!("Activity with id {} not found after update", activity_id))
}

/// Appends an achievement to one of the user's activities, stamped with
/// the given day
#[instrument(skip(pool, title), fields(activity_id = %activity_id))]
pub async fn add_achievement(
    pool: &DbPool,
    user_id: &str,
    activity_id: &str,
    title: String,
    date: NaiveDate,
) -> Result<Activity> {
    let activity = get_activity(pool, user_id, activity_id)?
        .ok_or_else(|| anyhow::anyhow!("Activity with id {} not found", activity_id))?;

    let mut achievements = activity.get_achievements();
    achievements.0.push(Achievement { title, date });

    let mut conn = pool.get()?;

    diesel::update(activities::table.find(activity_id.to_string()))
        .set((
            activities::achievements.eq(AchievementList(achievements.0)),
            activities::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_activity(pool, user_id, activity_id)?
        .ok_or_else(|| anyhow::anyhow!("Activity with id {} not found after update", activity_id))
}

/// Deletes one of the user's activities
#[instrument(skip(pool), fields(activity_id = %activity_id))]
pub async fn delete_activity(pool: &DbPool, user_id: &str, activity_id: &str) -> Result<()> {
    info!("Deleting activity");

    let _activity = get_activity(pool, user_id, activity_id)?
        .ok_or_else(|| anyhow::anyhow!("Activity with id {} not found", activity_id))?;

    let mut conn = pool.get()?;

    diesel::delete(activities::table.find(activity_id.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}
