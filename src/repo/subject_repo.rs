use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{DeletePolicy, Subject};
use crate::schema::{assignments, subjects};
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed subject row
#[instrument(skip(pool, new_subject), fields(name = %new_subject.get_name()))]
pub async fn create_subject(pool: &DbPool, new_subject: Subject) -> Result<Subject> {
    debug!("Creating new subject");

    let mut conn = pool.get()?;

    diesel::insert_into(subjects::table)
        .values(new_subject.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created subject with id: {}", new_subject.get_id());

    Ok(new_subject)
}

/// Retrieves one of the user's subjects by ID
#[instrument(skip(pool), fields(subject_id = %subject_id))]
pub fn get_subject(pool: &DbPool, user_id: &str, subject_id: &str) -> Result<Option<Subject>> {
    let conn = &mut pool.get()?;

    let result = subjects::table
        .filter(subjects::user_id.eq(user_id))
        .filter(subjects::id.eq(subject_id))
        .first::<Subject>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the user's active subjects
#[instrument(skip(pool))]
pub fn list_subjects(pool: &DbPool, user_id: &str) -> Result<Vec<Subject>> {
    let conn = &mut pool.get()?;

    let result = subjects::table
        .filter(subjects::user_id.eq(user_id))
        .filter(subjects::active.eq(true))
        .order(subjects::name.asc())
        .load::<Subject>(conn)?;

    Ok(result)
}

/// Whether the user already has a subject with this name, optionally
/// ignoring one subject (the row being updated)
pub fn subject_name_exists(
    pool: &DbPool,
    user_id: &str,
    name: &str,
    exclude_subject_id: Option<&str>,
) -> Result<bool> {
    let conn = &mut pool.get()?;

    let mut query = subjects::table
        .filter(subjects::user_id.eq(user_id.to_string()))
        .filter(subjects::name.eq(name.to_string()))
        .into_boxed();
    if let Some(subject_id) = exclude_subject_id {
        query = query.filter(subjects::id.ne(subject_id.to_string()));
    }

    let count: i64 = query.count().get_result(conn)?;

    Ok(count > 0)
}

/// Number of assignments tagged with a subject
pub fn subject_assignment_count(pool: &DbPool, subject_id: &str) -> Result<i64> {
    let conn = &mut pool.get()?;

    let count: i64 = assignments::table
        .filter(assignments::subject_id.eq(subject_id))
        .count()
        .get_result(conn)?;

    Ok(count)
}

/// Applies a partial update to one of the user's subjects
#[instrument(skip_all, fields(subject_id = %subject_id))]
pub async fn update_subject(
    pool: &DbPool,
    user_id: &str,
    subject_id: &str,
    name: Option<String>,
    description: Option<String>,
    color: Option<String>,
    active: Option<bool>,
) -> Result<Subject> {
    debug!("Updating subject");

    let subject = get_subject(pool, user_id, subject_id)?
        .ok_or_else(|| anyhow::anyhow!("Subject with id {} not found", subject_id))?;

    // Nothing to change; an all-None changeset is a Diesel error
    if name.is_none() && description.is_none() && color.is_none() && active.is_none() {
        return Ok(subject);
    }

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = subjects)]
    struct SubjectChangeset {
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
        active: Option<bool>,
    }

    let changeset = SubjectChangeset {
        name,
        description,
        color,
        active,
    };

    let mut conn = pool.get()?;

    diesel::update(subjects::table.find(subject_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_subject(pool, user_id, subject_id)?
        .ok_or_else(|| anyhow::anyhow!("Subject with id {} not found after update", subject_id))
}

/// Deletes one of the user's subjects under the given policy.
///
/// The handler picks Hard only when the subject has no assignments;
/// Soft keeps the row for its assignment history.
#[instrument(skip(pool), fields(subject_id = %subject_id, ?policy))]
pub async fn delete_subject(
    pool: &DbPool,
    user_id: &str,
    subject_id: &str,
    policy: DeletePolicy,
) -> Result<()> {
    let _subject = get_subject(pool, user_id, subject_id)?
        .ok_or_else(|| anyhow::anyhow!("Subject with id {} not found", subject_id))?;

    let mut conn = pool.get()?;

    match policy {
        DeletePolicy::Soft => {
            info!("Deactivating subject");

            diesel::update(subjects::table.find(subject_id.to_string()))
                .set(subjects::active.eq(false))
                .execute_with_retry(&mut conn)
                .await?;
        }
        DeletePolicy::Hard => {
            info!("Deleting subject");

            diesel::delete(subjects::table.find(subject_id.to_string()))
                .execute_with_retry(&mut conn)
                .await?;
        }
    }

    Ok(())
}
