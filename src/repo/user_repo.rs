use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Preferences, User};
use crate::schema::{
    academic_periods, activities, assignments, attendance, goals, grades, sessions, students,
    subjects, submissions, users,
};
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed user row.
///
/// Uniqueness of username and email is checked by the handler before the
/// insert; the UNIQUE constraints are the backstop for races.
#[instrument(skip(pool, new_user), fields(username = %new_user.get_username()))]
pub async fn create_user(pool: &DbPool, new_user: User) -> Result<User> {
    debug!("Creating new user");

    let mut conn = pool.get()?;

    diesel::insert_into(users::table)
        .values(new_user.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created user with id: {}", new_user.get_id());

    Ok(new_user)
}

/// Retrieves a user by ID
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves a user by login name, accepting either username or email
#[instrument(skip(pool))]
pub fn get_user_by_login(pool: &DbPool, login: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::username.eq(login).or(users::email.eq(login)))
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Whether a username is already taken
pub fn username_exists(pool: &DbPool, username: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let count: i64 = users::table
        .filter(users::username.eq(username))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

/// Whether an email is already taken, optionally ignoring one user
/// (the account being updated)
pub fn email_exists(pool: &DbPool, email: &str, exclude_user_id: Option<&str>) -> Result<bool> {
    let conn = &mut pool.get()?;

    let mut query = users::table.filter(users::email.eq(email)).into_boxed();
    if let Some(user_id) = exclude_user_id {
        query = query.filter(users::id.ne(user_id.to_string()));
    }

    let count: i64 = query.count().get_result(conn)?;

    Ok(count > 0)
}

/// Applies a partial update to a user's profile fields
#[instrument(skip(pool, first_name, last_name, email, timezone, preferences), fields(user_id = %user_id))]
pub async fn update_user(
    pool: &DbPool,
    user_id: &str,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    timezone: Option<String>,
    preferences: Option<Preferences>,
) -> Result<User> {
    debug!("Updating user");

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = users)]
    struct UserChangeset {
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        timezone: Option<String>,
        preferences: Option<Preferences>,
        updated_at: NaiveDateTime,
    }

    let changeset = UserChangeset {
        first_name,
        last_name,
        email,
        timezone,
        preferences,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(users::table.find(user_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_user(pool, user_id)?
        .ok_or_else(|| anyhow::anyhow!("User with id {} not found after update", user_id))
}

/// Replaces a user's password digest
#[instrument(skip(pool, password_hash), fields(user_id = %user_id))]
pub async fn update_password(pool: &DbPool, user_id: &str, password_hash: String) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::update(users::table.find(user_id.to_string()))
        .set((
            users::password_hash.eq(password_hash),
            users::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Deletes a user account and everything it owns.
///
/// SQLite foreign keys aren't relied on here; the dependents are removed
/// explicitly, leaf-first, in one transaction.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn delete_user(pool: &DbPool, user_id: &str) -> Result<()> {
    info!("Deleting user account and all owned data");

    let conn = &mut pool.get()?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let student_ids: Vec<String> = students::table
            .filter(students::user_id.eq(user_id))
            .select(students::id)
            .load(conn)?;

        let assignment_ids: Vec<String> = assignments::table
            .filter(assignments::student_id.eq_any(&student_ids))
            .select(assignments::id)
            .load(conn)?;

        diesel::delete(grades::table.filter(grades::assignment_id.eq_any(&assignment_ids)))
            .execute(conn)?;
        diesel::delete(
            submissions::table.filter(submissions::assignment_id.eq_any(&assignment_ids)),
        )
        .execute(conn)?;
        diesel::delete(assignments::table.filter(assignments::student_id.eq_any(&student_ids)))
            .execute(conn)?;
        diesel::delete(attendance::table.filter(attendance::student_id.eq_any(&student_ids)))
            .execute(conn)?;
        diesel::delete(goals::table.filter(goals::student_id.eq_any(&student_ids)))
            .execute(conn)?;
        diesel::delete(activities::table.filter(activities::student_id.eq_any(&student_ids)))
            .execute(conn)?;
        diesel::delete(students::table.filter(students::user_id.eq(user_id))).execute(conn)?;
        diesel::delete(subjects::table.filter(subjects::user_id.eq(user_id))).execute(conn)?;
        diesel::delete(
            academic_periods::table.filter(academic_periods::user_id.eq(user_id)),
        )
        .execute(conn)?;
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;
        diesel::delete(users::table.find(user_id.to_string())).execute(conn)?;

        Ok(())
    })?;

    Ok(())
}
