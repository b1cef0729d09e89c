use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Days, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::{
    parse_date, parse_date_option, require_field, AssignmentFilterQuery, CreateStudentDto,
    UpdateStudentDto,
};
use crate::errors::ApiError;
use crate::metrics;
use crate::models::{DeletePolicy, Student};
use crate::repo;
use crate::views::{
    AssignmentSummaryView, GradeTrendPoint, GradeView, GradeWithAssignmentView, MessageResponse,
    StudentCreatedResponse, StudentDashboardView, StudentProgressView, StudentView,
    SubjectAverageView,
};

use super::assignment_handlers::assignment_views;

/// How far back the headline attendance rate looks
const ATTENDANCE_WINDOW_DAYS: u64 = 30;

/// Assembles the full view of a student: row + GPA + 30-day attendance rate
pub(crate) fn student_view(
    pool: &DbPool,
    user_id: &str,
    student: &Student,
    today: NaiveDate,
) -> Result<StudentView, ApiError> {
    let points = repo::student_grade_points(pool, user_id, &student.get_id())
        .map_err(ApiError::Database)?;
    let percentages: Vec<f64> = points
        .iter()
        .filter_map(|(earned, total)| metrics::grade_percentage(*earned, *total))
        .collect();
    let current_gpa = metrics::gpa(&percentages);

    let window_start = today - Days::new(ATTENDANCE_WINDOW_DAYS);
    let recent_attendance = repo::list_attendance(
        pool,
        user_id,
        &student.get_id(),
        Some(window_start),
        Some(today),
    )
    .map_err(ApiError::Database)?;
    let attendance_rate = metrics::attendance_rate(&recent_attendance);

    Ok(StudentView::from_parts(
        student,
        current_gpa,
        attendance_rate,
        today,
    ))
}

fn owned_student(pool: &DbPool, user_id: &str, student_id: &str) -> Result<Student, ApiError> {
    repo::get_student(pool, user_id, student_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)
}

/// Handler for listing the user's active students
///
/// This function handles GET requests to `/students`.
#[instrument(skip(pool, user))]
pub async fn list_students_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    debug!("Listing students");

    let students = repo::list_students(&pool, &user.id()).map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let views = students
        .iter()
        .map(|s| student_view(&pool, &user.id(), s, today))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Retrieved {} students", views.len());

    Ok(Json(views))
}

/// Handler for creating a new student
///
/// This function handles POST requests to `/students`.
#[instrument(skip(pool, user, payload))]
pub async fn create_student_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<CreateStudentDto>,
) -> Result<(StatusCode, Json<StudentCreatedResponse>), ApiError> {
    info!("Creating new student");

    let first_name = require_field(payload.first_name, "first_name")?;
    let last_name = require_field(payload.last_name, "last_name")?;
    let date_of_birth = parse_date(&require_field(payload.date_of_birth, "date_of_birth")?)?;
    let grade_level = require_field(payload.grade_level, "grade_level")?;

    if let Some(student_code) = &payload.student_code {
        if repo::student_code_exists(&pool, student_code, None).map_err(ApiError::Database)? {
            return Err(ApiError::Conflict("Student code already exists".to_string()));
        }
    }

    let student = repo::create_student(
        &pool,
        Student::new(
            user.id(),
            first_name,
            last_name,
            date_of_birth,
            grade_level,
            payload.student_code,
            payload.profile_picture,
            payload.notes,
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let view = student_view(&pool, &user.id(), &student, today)?;

    Ok((
        StatusCode::CREATED,
        Json(StudentCreatedResponse {
            message: "Student created successfully".to_string(),
            student: view,
        }),
    ))
}

/// Handler for retrieving a specific student
///
/// This function handles GET requests to `/students/{id}`.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn get_student_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<StudentView>, ApiError> {
    let student = owned_student(&pool, &user.id(), &student_id)?;

    let today = Utc::now().date_naive();
    let view = student_view(&pool, &user.id(), &student, today)?;

    Ok(Json(view))
}

/// Handler for updating a student
///
/// This function handles PUT requests to `/students/{id}`. Only fields
/// present in the payload are changed.
#[instrument(skip(pool, user, payload), fields(student_id = %student_id))]
pub async fn update_student_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Json(payload): Json<UpdateStudentDto>,
) -> Result<Json<StudentView>, ApiError> {
    debug!("Updating student");

    owned_student(&pool, &user.id(), &student_id)?;

    let date_of_birth = parse_date_option(payload.date_of_birth.as_deref())?;

    if let Some(student_code) = &payload.student_code {
        if repo::student_code_exists(&pool, student_code, Some(&student_id))
            .map_err(ApiError::Database)?
        {
            return Err(ApiError::Conflict("Student code already exists".to_string()));
        }
    }

    let updated = repo::update_student(
        &pool,
        &user.id(),
        &student_id,
        payload.first_name,
        payload.last_name,
        date_of_birth,
        payload.grade_level,
        payload.student_code,
        payload.profile_picture,
        payload.notes,
        payload.active,
    )
    .await
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    let view = student_view(&pool, &user.id(), &updated, today)?;

    Ok(Json(view))
}

/// Handler for deleting (deactivating) a student
///
/// This function handles DELETE requests to `/students/{id}`. Students
/// are always soft-deleted so their history stays queryable.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn delete_student_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deactivating student {}", student_id);

    owned_student(&pool, &user.id(), &student_id)?;

    repo::delete_student(&pool, &user.id(), &student_id, DeletePolicy::Soft)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(MessageResponse::new("Student deactivated successfully")))
}

/// Handler for a student's dashboard
///
/// This function handles GET requests to `/students/{id}/dashboard`:
/// recent assignments, a 30-day attendance summary, active goals and the
/// headline aggregates.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn student_dashboard_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDashboardView>, ApiError> {
    debug!("Building student dashboard");

    let student = owned_student(&pool, &user.id(), &student_id)?;
    let today = Utc::now().date_naive();

    let recent = repo::list_assignments(&pool, &user.id(), Some(&student_id), None, None, Some(5))
        .map_err(ApiError::Database)?;

    let window_start = today - Days::new(ATTENDANCE_WINDOW_DAYS);
    let recent_attendance = repo::list_attendance(
        &pool,
        &user.id(),
        &student_id,
        Some(window_start),
        Some(today),
    )
    .map_err(ApiError::Database)?;
    let attendance_summary = metrics::attendance_summary(&recent_attendance);

    let active_goals = repo::list_goals(&pool, &user.id(), &student_id, Some("active"))
        .map_err(ApiError::Database)?;

    let view = student_view(&pool, &user.id(), &student, today)?;
    let current_gpa = view.current_gpa;
    let attendance_rate = view.attendance_rate;

    Ok(Json(StudentDashboardView {
        student: view,
        recent_assignments: assignment_views(&pool, &user.id(), &recent, today)?,
        attendance_summary,
        active_goals: active_goals
            .iter()
            .map(|g| crate::views::GoalView::from_parts(g, today))
            .collect(),
        current_gpa,
        attendance_rate,
    }))
}

/// Handler for listing a student's assignments
///
/// This function handles GET requests to `/students/{id}/assignments`,
/// with optional status, subject_id and limit filters.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn student_assignments_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    Query(filter): Query<AssignmentFilterQuery>,
) -> Result<Json<Vec<crate::views::AssignmentView>>, ApiError> {
    owned_student(&pool, &user.id(), &student_id)?;

    let assignments = repo::list_assignments(
        &pool,
        &user.id(),
        Some(&student_id),
        filter.subject_id.as_deref(),
        filter.status.as_deref(),
        filter.limit,
    )
    .map_err(ApiError::Database)?;

    let today = Utc::now().date_naive();
    Ok(Json(assignment_views(&pool, &user.id(), &assignments, today)?))
}

/// Handler for listing a student's grades
///
/// This function handles GET requests to `/students/{id}/grades`, newest
/// grading first, each grade paired with its assignment summary.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn student_grades_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<GradeWithAssignmentView>>, ApiError> {
    owned_student(&pool, &user.id(), &student_id)?;

    let graded = repo::list_grades_for_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?;

    let views = graded
        .iter()
        .map(|(grade, assignment)| GradeWithAssignmentView {
            grade: GradeView::from_parts(grade, assignment.get_points_total()),
            assignment: AssignmentSummaryView::from_assignment(assignment),
        })
        .collect();

    Ok(Json(views))
}

/// Handler for a student's progress analytics
///
/// This function handles GET requests to `/students/{id}/progress`:
/// the grade trend over time, per-subject averages and completion counts.
#[instrument(skip(pool, user), fields(student_id = %student_id))]
pub async fn student_progress_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<Json<StudentProgressView>, ApiError> {
    debug!("Building student progress report");

    let student = owned_student(&pool, &user.id(), &student_id)?;
    let today = Utc::now().date_naive();

    let mut graded = repo::list_grades_for_student(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?;
    // list_grades_for_student returns newest first; trends read oldest first
    graded.reverse();

    let grade_trends = graded
        .iter()
        .map(|(grade, assignment)| GradeTrendPoint {
            date: grade.get_graded_at_raw(),
            percentage: metrics::grade_percentage(
                grade.get_points_earned(),
                assignment.get_points_total(),
            ),
            assignment_title: assignment.get_title(),
        })
        .collect();

    // Group percentages by subject; assignments without a subject don't
    // contribute to per-subject averages
    let mut by_subject: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (grade, assignment) in &graded {
        let (Some(subject_id), Some(percentage)) = (
            assignment.get_subject_id(),
            metrics::grade_percentage(grade.get_points_earned(), assignment.get_points_total()),
        ) else {
            continue;
        };
        by_subject.entry(subject_id).or_default().push(percentage);
    }

    let mut subject_averages = Vec::new();
    for (subject_id, percentages) in by_subject {
        let Some(subject) =
            repo::get_subject(&pool, &user.id(), &subject_id).map_err(ApiError::Database)?
        else {
            continue;
        };
        if let Some(average) = metrics::gpa(&percentages) {
            subject_averages.push(SubjectAverageView {
                subject: subject.get_name(),
                color: subject.get_color(),
                average,
            });
        }
    }

    let assignments =
        repo::list_assignments(&pool, &user.id(), Some(&student_id), None, None, None)
            .map_err(ApiError::Database)?;
    let completed_assignments = assignments
        .iter()
        .filter(|a| a.get_status() == crate::models::AssignmentStatus::Graded)
        .count();

    let points = repo::student_grade_points(&pool, &user.id(), &student_id)
        .map_err(ApiError::Database)?;
    let percentages: Vec<f64> = points
        .iter()
        .filter_map(|(earned, total)| metrics::grade_percentage(*earned, *total))
        .collect();

    Ok(Json(StudentProgressView {
        student: student_view(&pool, &user.id(), &student, today)?,
        grade_trends,
        subject_averages,
        overall_gpa: metrics::gpa(&percentages),
        total_assignments: assignments.len(),
        completed_assignments,
    }))
}
