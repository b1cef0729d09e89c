use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{DeletePolicy, Student};
use crate::schema::{activities, assignments, attendance, goals, grades, students, submissions};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed student row
#[instrument(skip(pool, new_student), fields(student_id = %new_student.get_id()))]
pub async fn create_student(pool: &DbPool, new_student: Student) -> Result<Student> {
    debug!("Creating new student");

    let mut conn = pool.get()?;

    diesel::insert_into(students::table)
        .values(new_student.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created student with id: {}", new_student.get_id());

    Ok(new_student)
}

/// Retrieves one of the user's students by ID.
///
/// A student owned by someone else comes back as None, exactly like a
/// missing one. Inactive students are still retrievable by ID.
#[instrument(skip(pool), fields(student_id = %student_id))]
pub fn get_student(pool: &DbPool, user_id: &str, student_id: &str) -> Result<Option<Student>> {
    let conn = &mut pool.get()?;

    let result = students::table
        .filter(students::user_id.eq(user_id))
        .filter(students::id.eq(student_id))
        .first::<Student>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the user's active students
#[instrument(skip(pool))]
pub fn list_students(pool: &DbPool, user_id: &str) -> Result<Vec<Student>> {
    let conn = &mut pool.get()?;

    let result = students::table
        .filter(students::user_id.eq(user_id))
        .filter(students::active.eq(true))
        .order(students::created_at.asc())
        .load::<Student>(conn)?;

    Ok(result)
}

/// Whether a custom student code is already in use, optionally ignoring
/// one student (the row being updated)
pub fn student_code_exists(
    pool: &DbPool,
    student_code: &str,
    exclude_student_id: Option<&str>,
) -> Result<bool> {
    let conn = &mut pool.get()?;

    let mut query = students::table
        .filter(students::student_code.eq(student_code))
        .into_boxed();
    if let Some(student_id) = exclude_student_id {
        query = query.filter(students::id.ne(student_id.to_string()));
    }

    let count: i64 = query.count().get_result(conn)?;

    Ok(count > 0)
}

/// Applies a partial update to one of the user's students
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(student_id = %student_id))]
pub async fn update_student(
    pool: &DbPool,
    user_id: &str,
    student_id: &str,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    grade_level: Option<String>,
    student_code: Option<String>,
    profile_picture: Option<String>,
    notes: Option<String>,
    active: Option<bool>,
) -> Result<Student> {
    debug!("Updating student");

    let _student = get_student(pool, user_id, student_id)?
        .ok_or_else(|| anyhow::anyhow!("Student with id {} not found", student_id))?;

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = students)]
    struct StudentChangeset {
        first_name: Option<String>,
        last_name: Option<String>,
        date_of_birth: Option<NaiveDate>,
        grade_level: Option<String>,
        student_code: Option<String>,
        profile_picture: Option<String>,
        notes: Option<String>,
        active: Option<bool>,
        updated_at: NaiveDateTime,
    }

    let changeset = StudentChangeset {
        first_name,
        last_name,
        date_of_birth,
        grade_level,
        student_code,
        profile_picture,
        notes,
        active,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(students::table.find(student_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_student(pool, user_id, student_id)?
        .ok_or_else(|| anyhow::anyhow!("Student with id {} not found after update", student_id))
}

/// Deletes one of the user's students under the given policy.
///
/// Soft keeps the row and its history, flipping `active` off. Hard removes
/// the student and every dependent row, leaf-first, in one transaction.
#[instrument(skip(pool), fields(student_id = %student_id, ?policy))]
pub async fn delete_student(
    pool: &DbPool,
    user_id: &str,
    student_id: &str,
    policy: DeletePolicy,
) -> Result<()> {
    let _student = get_student(pool, user_id, student_id)?
        .ok_or_else(|| anyhow::anyhow!("Student with id {} not found", student_id))?;

    match policy {
        DeletePolicy::Soft => {
            info!("Deactivating student");

            let mut conn = pool.get()?;
            diesel::update(students::table.find(student_id.to_string()))
                .set((
                    students::active.eq(false),
                    students::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute_with_retry(&mut conn)
                .await?;
        }
        DeletePolicy::Hard => {
            info!("Deleting student and all dependent rows");

            let conn = &mut pool.get()?;
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let assignment_ids: Vec<String> = assignments::table
                    .filter(assignments::student_id.eq(student_id))
                    .select(assignments::id)
                    .load(conn)?;

                diesel::delete(
                    grades::table.filter(grades::assignment_id.eq_any(&assignment_ids)),
                )
                .execute(conn)?;
                diesel::delete(
                    submissions::table.filter(submissions::assignment_id.eq_any(&assignment_ids)),
                )
                .execute(conn)?;
                diesel::delete(
                    assignments::table.filter(assignments::student_id.eq(student_id)),
                )
                .execute(conn)?;
                diesel::delete(attendance::table.filter(attendance::student_id.eq(student_id)))
                    .execute(conn)?;
                diesel::delete(goals::table.filter(goals::student_id.eq(student_id)))
                    .execute(conn)?;
                diesel::delete(activities::table.filter(activities::student_id.eq(student_id)))
                    .execute(conn)?;
                diesel::delete(students::table.find(student_id.to_string())).execute(conn)?;

                Ok(())
            })?;
        }
    }

    Ok(())
}
