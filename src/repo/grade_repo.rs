use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Assignment, Grade, RubricScores};
use crate::schema::{assignments, grades, students};
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed grade row.
///
/// Ownership of the graded assignment is verified by the handler; the
/// UNIQUE constraint on assignment_id enforces the one-grade-per-assignment
/// invariant against races.
#[instrument(skip(pool, new_grade), fields(assignment_id = %new_grade.get_assignment_id()))]
pub async fn create_grade(pool: &DbPool, new_grade: Grade) -> Result<Grade> {
    debug!("Creating new grade");

    let mut conn = pool.get()?;

    diesel::insert_into(grades::table)
        .values(new_grade.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created grade with id: {}", new_grade.get_id());

    Ok(new_grade)
}

/// Retrieves the grade for one of the user's assignments, scoped through
/// the assignment's owning student
#[instrument(skip(pool), fields(assignment_id = %assignment_id))]
pub fn get_grade_for_assignment(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
) -> Result<Option<Grade>> {
    let conn = &mut pool.get()?;

    let result = grades::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(grades::assignment_id.eq(assignment_id))
        .select(Grade::as_select())
        .first::<Grade>(conn)
        .optional()?;

    Ok(result)
}

/// Applies a partial update to the grade on one of the user's assignments.
///
/// A change to the earned points re-stamps the grader and grading time.
#[instrument(skip_all, fields(assignment_id = %assignment_id))]
pub async fn update_grade(
    pool: &DbPool,
    user_id: &str,
    assignment_id: &str,
    points_earned: Option<f64>,
    feedback: Option<String>,
    rubric_scores: Option<RubricScores>,
    graded_by: &str,
) -> Result<Grade> {
    debug!("Updating grade");

    let grade = get_grade_for_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Assignment {} has no grade", assignment_id))?;

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = grades)]
    struct GradeChangeset {
        points_earned: Option<f64>,
        feedback: Option<String>,
        rubric_scores: Option<RubricScores>,
        graded_by: Option<String>,
        graded_at: Option<NaiveDateTime>,
        updated_at: NaiveDateTime,
    }

    let now = Utc::now().naive_utc();
    let regraded = points_earned.is_some();

    let changeset = GradeChangeset {
        points_earned,
        feedback,
        rubric_scores,
        graded_by: regraded.then(|| graded_by.to_string()),
        graded_at: regraded.then_some(now),
        updated_at: now,
    };

    let mut conn = pool.get()?;

    diesel::update(grades::table.find(grade.get_id()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_grade_for_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Grade for assignment {} not found after update", assignment_id))
}

/// Deletes the grade on one of the user's assignments
#[instrument(skip(pool), fields(assignment_id = %assignment_id))]
pub async fn delete_grade(pool: &DbPool, user_id: &str, assignment_id: &str) -> Result<()> {
    info!("Deleting grade");

    let grade = get_grade_for_assignment(pool, user_id, assignment_id)?
        .ok_or_else(|| anyhow::anyhow!("Assignment {} has no grade", assignment_id))?;

    let mut conn = pool.get()?;

    diesel::delete(grades::table.find(grade.get_id()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// All grades for one of the user's students with their assignments,
/// newest grading first
#[instrument(skip(pool), fields(student_id = %student_id))]
pub fn list_grades_for_student(
    pool: &DbPool,
    user_id: &str,
    student_id: &str,
) -> Result<Vec<(Grade, Assignment)>> {
    let conn = &mut pool.get()?;

    let result = grades::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(assignments::student_id.eq(student_id))
        .order(grades::graded_at.desc())
        .select((Grade::as_select(), Assignment::as_select()))
        .load::<(Grade, Assignment)>(conn)?;

    Ok(result)
}

/// (points_earned, points_total) pairs for a student's graded assignments
#[instrument(skip(pool), fields(student_id = %student_id))]
pub fn student_grade_points(
    pool: &DbPool,
    user_id: &str,
    student_id: &str,
) -> Result<Vec<(f64, i32)>> {
    let conn = &mut pool.get()?;

    let result = grades::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(assignments::student_id.eq(student_id))
        .select((grades::points_earned, assignments::points_total))
        .load::<(f64, i32)>(conn)?;

    Ok(result)
}

/// (points_earned, points_total) pairs for every graded assignment in a
/// subject
#[instrument(skip(pool), fields(subject_id = %subject_id))]
pub fn subject_grade_points(
    pool: &DbPool,
    user_id: &str,
    subject_id: &str,
) -> Result<Vec<(f64, i32)>> {
    let conn = &mut pool.get()?;

    let result = grades::table
        .inner_join(assignments::table.inner_join(students::table))
        .filter(students::user_id.eq(user_id))
        .filter(assignments::subject_id.eq(subject_id))
        .select((grades::points_earned, assignments::points_total))
        .load::<(f64, i32)>(conn)?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Student;
    use crate::repo;
    use crate::repo::tests::{create_test_user, setup_test_db};
    use chrono::NaiveDate;

    async fn fixture(pool: &DbPool) -> (String, String, String) {
        let user = create_test_user(pool, "meg").await;
        let student = repo::create_student(
            pool,
            Student::new(
                user.get_id(),
                "Charles".to_string(),
                "Wallace".to_string(),
                NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
                "5".to_string(),
                None,
                None,
                None,
            ),
        )
        .await
        .unwrap();
        let assignment = repo::create_assignment(
            pool,
            Assignment::new(
                student.get_id(),
                None,
                "Math homework".to_string(),
                None,
                None,
                None,
                None,
                100,
                "homework".to_string(),
                "medium".to_string(),
                "normal".to_string(),
                None,
                None,
            ),
        )
        .await
        .unwrap();
        (user.get_id(), student.get_id(), assignment.get_id())
    }

    #[tokio::test]
    async fn test_grade_round_trip() {
        let pool = setup_test_db();
        let (user_id, _, assignment_id) = fixture(&pool).await;

        create_grade(
            &pool,
            Grade::new(assignment_id.clone(), 90.0, Some("Nice work".to_string()), None, user_id.clone()),
        )
        .await
        .unwrap();

        let fetched = get_grade_for_assignment(&pool, &user_id, &assignment_id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched.get_points_earned(), 90.0);
        assert_eq!(fetched.get_feedback().as_deref(), Some("Nice work"));
    }

    #[tokio::test]
    async fn test_grades_are_ownership_scoped() {
        let pool = setup_test_db();
        let (user_id, _, assignment_id) = fixture(&pool).await;
        let other = create_test_user(&pool, "calvin").await;

        create_grade(
            &pool,
            Grade::new(assignment_id.clone(), 90.0, None, None, user_id.clone()),
        )
        .await
        .unwrap();

        assert!(get_grade_for_assignment(&pool, &other.get_id(), &assignment_id)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_points_restamps_grader() {
        let pool = setup_test_db();
        let (user_id, _, assignment_id) = fixture(&pool).await;

        let grade = create_grade(
            &pool,
            Grade::new(assignment_id.clone(), 70.0, None, None, user_id.clone()),
        )
        .await
        .unwrap();

        let updated = update_grade(
            &pool,
            &user_id,
            &assignment_id,
            Some(95.0),
            None,
            None,
            &user_id,
        )
        .await
        .unwrap();

        assert_eq!(updated.get_points_earned(), 95.0);
        assert!(updated.get_graded_at_raw() >= grade.get_graded_at_raw());
    }

    #[tokio::test]
    async fn test_student_grade_points() {
        let pool = setup_test_db();
        let (user_id, student_id, assignment_id) = fixture(&pool).await;

        create_grade(
            &pool,
            Grade::new(assignment_id, 90.0, None, None, user_id.clone()),
        )
        .await
        .unwrap();

        let points = student_grade_points(&pool, &user_id, &student_id).unwrap();
        assert_eq!(points, vec![(90.0, 100)]);
    }
}
