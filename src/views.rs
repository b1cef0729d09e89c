/// Response shaping
///
/// Each entity has a view struct pairing the stored row with its derived
/// fields, recomputed on every read. Views are the only serialization
/// surface the API exposes; derived values never flow back into storage.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::metrics;
use crate::metrics::AttendanceSummary;
use crate::models::{
    AcademicPeriod, Achievement, Activity, Assignment, Attendance, Goal, Grade, Student, Subject,
    Submission, User,
};

/// A user account, without credentials
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub timezone: String,
    pub preferences: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserView {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.get_id(),
            username: user.get_username(),
            email: user.get_email(),
            first_name: user.get_first_name(),
            last_name: user.get_last_name(),
            full_name: user.get_full_name(),
            timezone: user.get_timezone(),
            preferences: user.get_preferences().map(|p| p.0),
            created_at: user.get_created_at_raw(),
            updated_at: user.get_updated_at_raw(),
        }
    }
}

/// A student profile with its aggregate academics
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub grade_level: String,
    pub student_code: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    /// Mean percentage across all graded assignments; None when ungraded
    pub current_gpa: Option<f64>,
    /// Attendance rate over the last 30 days; None without records
    pub attendance_rate: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StudentView {
    pub fn from_parts(
        student: &Student,
        current_gpa: Option<f64>,
        attendance_rate: Option<f64>,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: student.get_id(),
            user_id: student.get_user_id(),
            first_name: student.get_first_name(),
            last_name: student.get_last_name(),
            full_name: student.get_full_name(),
            date_of_birth: student.get_date_of_birth(),
            age: metrics::age_on(student.get_date_of_birth(), today),
            grade_level: student.get_grade_level(),
            student_code: student.get_student_code(),
            profile_picture: student.get_profile_picture(),
            notes: student.get_notes(),
            active: student.get_active(),
            current_gpa,
            attendance_rate,
            created_at: student.get_created_at_raw(),
            updated_at: student.get_updated_at_raw(),
        }
    }
}

/// A subject with its assignment aggregates
#[derive(Debug, Clone, Serialize)]
pub struct SubjectView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub active: bool,
    pub assignment_count: i64,
    pub average_grade: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl SubjectView {
    pub fn from_parts(subject: &Subject, assignment_count: i64, average_grade: Option<f64>) -> Self {
        Self {
            id: subject.get_id(),
            user_id: subject.get_user_id(),
            name: subject.get_name(),
            description: subject.get_description(),
            color: subject.get_color(),
            active: subject.get_active(),
            assignment_count,
            average_grade,
            created_at: subject.get_created_at_raw(),
        }
    }
}

/// An assignment with its grading and submission state
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub id: String,
    pub student_id: String,
    pub subject_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub estimated_duration: Option<i32>,
    pub points_total: i32,
    pub assignment_type: String,
    pub difficulty_level: String,
    pub status: String,
    pub priority: String,
    pub tags: Vec<String>,
    pub resources: Vec<String>,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
    pub grade_percentage: Option<f64>,
    pub grade_letter: Option<&'static str>,
    pub is_graded: bool,
    pub submission_count: usize,
    pub latest_submission: Option<SubmissionView>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AssignmentView {
    pub fn from_parts(
        assignment: &Assignment,
        grade: Option<&Grade>,
        submissions: &[Submission],
        today: NaiveDate,
    ) -> Self {
        let grade_percentage = grade.and_then(|g| {
            metrics::grade_percentage(g.get_points_earned(), assignment.get_points_total())
        });
        let latest_submission = submissions
            .iter()
            .max_by_key(|s| s.get_submitted_at_raw())
            .map(SubmissionView::from_submission);

        Self {
            id: assignment.get_id(),
            student_id: assignment.get_student_id(),
            subject_id: assignment.get_subject_id(),
            title: assignment.get_title(),
            description: assignment.get_description(),
            instructions: assignment.get_instructions(),
            due_date: assignment.get_due_date(),
            estimated_duration: assignment.get_estimated_duration(),
            points_total: assignment.get_points_total(),
            assignment_type: assignment.get_assignment_type(),
            difficulty_level: assignment.get_difficulty_level(),
            status: assignment.get_status_raw(),
            priority: assignment.get_priority(),
            tags: assignment.get_tags().0,
            resources: assignment.get_resources().0,
            is_overdue: metrics::is_overdue(
                assignment.get_due_date(),
                assignment.get_status(),
                today,
            ),
            days_until_due: metrics::days_until(assignment.get_due_date(), today),
            grade_percentage,
            grade_letter: grade_percentage.map(metrics::letter_grade),
            is_graded: grade.is_some(),
            submission_count: submissions.len(),
            latest_submission,
            created_at: assignment.get_created_at_raw(),
            updated_at: assignment.get_updated_at_raw(),
        }
    }
}

/// A grade with its derived percentage and letter
#[derive(Debug, Clone, Serialize)]
pub struct GradeView {
    pub id: String,
    pub assignment_id: String,
    pub points_earned: f64,
    pub percentage: Option<f64>,
    pub grade_letter: Option<&'static str>,
    pub grade_color: &'static str,
    pub feedback: Option<String>,
    pub rubric_scores: BTreeMap<String, f64>,
    pub graded_by: String,
    pub graded_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl GradeView {
    /// Builds the view; `points_total` comes from the graded assignment
    pub fn from_parts(grade: &Grade, points_total: i32) -> Self {
        let percentage = metrics::grade_percentage(grade.get_points_earned(), points_total);
        let grade_letter = percentage.map(metrics::letter_grade);

        Self {
            id: grade.get_id(),
            assignment_id: grade.get_assignment_id(),
            points_earned: grade.get_points_earned(),
            percentage,
            grade_letter,
            grade_color: metrics::grade_color(grade_letter.unwrap_or("")),
            feedback: grade.get_feedback(),
            rubric_scores: grade.get_rubric_scores().0,
            graded_by: grade.get_graded_by(),
            graded_at: grade.get_graded_at_raw(),
            created_at: grade.get_created_at_raw(),
            updated_at: grade.get_updated_at_raw(),
        }
    }
}

/// A grade paired with a short summary of its assignment, for grade listings
#[derive(Debug, Clone, Serialize)]
pub struct GradeWithAssignmentView {
    #[serde(flatten)]
    pub grade: GradeView,
    pub assignment: AssignmentSummaryView,
}

/// The slice of an assignment surfaced inside grade listings
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentSummaryView {
    pub id: String,
    pub title: String,
    pub subject_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub points_total: i32,
}

impl AssignmentSummaryView {
    pub fn from_assignment(assignment: &Assignment) -> Self {
        Self {
            id: assignment.get_id(),
            title: assignment.get_title(),
            subject_id: assignment.get_subject_id(),
            due_date: assignment.get_due_date(),
            points_total: assignment.get_points_total(),
        }
    }
}

/// A submission with its derived file metadata
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: String,
    pub assignment_id: String,
    pub submitted_at: NaiveDateTime,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i32>,
    pub file_size_formatted: Option<String>,
    pub mime_type: Option<String>,
    pub file_extension: Option<String>,
    pub is_image: bool,
    pub is_document: bool,
    /// Existence probe on the recorded path; no other integrity checking
    pub file_exists: bool,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl SubmissionView {
    pub fn from_submission(submission: &Submission) -> Self {
        let file_name = submission.get_file_name();
        let mime_type = submission.get_mime_type();
        let file_exists = submission
            .get_file_path()
            .is_some_and(|p| Path::new(&p).exists());

        Self {
            id: submission.get_id(),
            assignment_id: submission.get_assignment_id(),
            submitted_at: submission.get_submitted_at_raw(),
            file_path: submission.get_file_path(),
            file_size: submission.get_file_size(),
            file_size_formatted: submission.get_file_size().map(metrics::format_file_size),
            file_extension: file_name.as_deref().and_then(metrics::file_extension),
            is_image: metrics::is_image_file(mime_type.as_deref(), file_name.as_deref()),
            is_document: metrics::is_document_file(mime_type.as_deref(), file_name.as_deref()),
            file_exists,
            file_name,
            mime_type,
            notes: submission.get_notes(),
            status: submission.get_status(),
            created_at: submission.get_created_at_raw(),
        }
    }
}

/// One attendance record with its display metadata
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: String,
    pub status_color: &'static str,
    pub hours: f64,
    pub hours_formatted: String,
    pub notes: Option<String>,
    pub is_weekend: bool,
    pub is_today: bool,
    pub is_future: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AttendanceView {
    pub fn from_parts(record: &Attendance, today: NaiveDate) -> Self {
        let date = record.get_date();
        Self {
            id: record.get_id(),
            student_id: record.get_student_id(),
            date,
            status: record.get_status_raw(),
            status_color: metrics::attendance_status_color(record.get_status()),
            hours: record.get_hours(),
            hours_formatted: metrics::format_hours(record.get_hours()),
            notes: record.get_notes(),
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            is_today: date == today,
            is_future: date > today,
            created_at: record.get_created_at_raw(),
            updated_at: record.get_updated_at_raw(),
        }
    }
}

/// A goal with its progress-derived fields
#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    pub id: String,
    pub student_id: String,
    pub subject_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub goal_type: String,
    pub status: String,
    pub progress_percentage: i32,
    pub notes: Option<String>,
    pub is_overdue: bool,
    pub days_until_target: Option<i64>,
    pub status_color: &'static str,
    pub progress_color: &'static str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl GoalView {
    pub fn from_parts(goal: &Goal, today: NaiveDate) -> Self {
        Self {
            id: goal.get_id(),
            student_id: goal.get_student_id(),
            subject_id: goal.get_subject_id(),
            title: goal.get_title(),
            description: goal.get_description(),
            target_date: goal.get_target_date(),
            goal_type: goal.get_goal_type(),
            status: goal.get_status_raw(),
            progress_percentage: goal.get_progress_percentage(),
            notes: goal.get_notes(),
            is_overdue: metrics::goal_is_overdue(goal.get_target_date(), goal.get_status(), today),
            days_until_target: metrics::days_until(goal.get_target_date(), today),
            status_color: metrics::goal_status_color(goal.get_status()),
            progress_color: metrics::goal_progress_color(goal.get_progress_percentage()),
            created_at: goal.get_created_at_raw(),
            updated_at: goal.get_updated_at_raw(),
        }
    }
}

/// An activity with its date-derived status
#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    pub id: String,
    pub student_id: String,
    pub name: String,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub hours_total: Option<f64>,
    pub hours_formatted: Option<String>,
    pub achievements: Vec<Achievement>,
    pub notes: Option<String>,
    pub status: &'static str,
    pub status_color: &'static str,
    pub duration_days: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ActivityView {
    pub fn from_parts(activity: &Activity, today: NaiveDate) -> Self {
        let status =
            metrics::activity_status(activity.get_start_date(), activity.get_end_date(), today);
        Self {
            id: activity.get_id(),
            student_id: activity.get_student_id(),
            name: activity.get_name(),
            description: activity.get_description(),
            activity_type: activity.get_activity_type(),
            start_date: activity.get_start_date(),
            end_date: activity.get_end_date(),
            hours_total: activity.get_hours_total(),
            hours_formatted: activity.get_hours_total().map(metrics::format_hours),
            achievements: activity.get_achievements().0,
            notes: activity.get_notes(),
            status,
            status_color: metrics::activity_status_color(status),
            duration_days: metrics::activity_duration_days(
                activity.get_start_date(),
                activity.get_end_date(),
            ),
            created_at: activity.get_created_at_raw(),
            updated_at: activity.get_updated_at_raw(),
        }
    }
}

/// An academic period with its progress-derived fields
#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period_type: String,
    pub active: bool,
    pub is_current: bool,
    pub is_future: bool,
    pub is_past: bool,
    pub duration_days: i64,
    pub progress_percentage: f64,
    pub remaining_days: i64,
    pub created_at: NaiveDateTime,
}

impl PeriodView {
    pub fn from_parts(period: &AcademicPeriod, today: NaiveDate) -> Self {
        let start = period.get_start_date();
        let end = period.get_end_date();
        Self {
            id: period.get_id(),
            user_id: period.get_user_id(),
            name: period.get_name(),
            start_date: start,
            end_date: end,
            period_type: period.get_period_type(),
            active: period.get_active(),
            is_current: start <= today && today <= end,
            is_future: start > today,
            is_past: end < today,
            duration_days: metrics::period_duration_days(start, end),
            progress_percentage: metrics::period_progress(start, end, today),
            remaining_days: metrics::period_remaining_days(start, end, today),
            created_at: period.get_created_at_raw(),
        }
    }
}

/// Response body for registration and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
}

/// Plain confirmation body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Response body for creating a student
#[derive(Debug, Clone, Serialize)]
pub struct StudentCreatedResponse {
    pub message: String,
    pub student: StudentView,
}

/// Response body for creating a subject
#[derive(Debug, Clone, Serialize)]
pub struct SubjectCreatedResponse {
    pub message: String,
    pub subject: SubjectView,
}

/// Response body for creating an assignment
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentCreatedResponse {
    pub message: String,
    pub assignment: AssignmentView,
}

/// Response body for grading an assignment
#[derive(Debug, Clone, Serialize)]
pub struct GradedResponse {
    pub message: String,
    pub grade: GradeView,
    pub assignment: AssignmentView,
}

/// The per-student dashboard
#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboardView {
    pub student: StudentView,
    pub recent_assignments: Vec<AssignmentView>,
    pub attendance_summary: AttendanceSummary,
    pub active_goals: Vec<GoalView>,
    pub current_gpa: Option<f64>,
    pub attendance_rate: Option<f64>,
}

/// One point on a student's grade trend line
#[derive(Debug, Clone, Serialize)]
pub struct GradeTrendPoint {
    pub date: NaiveDateTime,
    pub percentage: Option<f64>,
    pub assignment_title: String,
}

/// Per-subject average for a student's progress report
#[derive(Debug, Clone, Serialize)]
pub struct SubjectAverageView {
    pub subject: String,
    pub color: Option<String>,
    pub average: f64,
}

/// A student's progress analytics
#[derive(Debug, Clone, Serialize)]
pub struct StudentProgressView {
    pub student: StudentView,
    pub grade_trends: Vec<GradeTrendPoint>,
    pub subject_averages: Vec<SubjectAverageView>,
    pub overall_gpa: Option<f64>,
    pub total_assignments: usize,
    pub completed_assignments: usize,
}

/// Per-subject analytics
#[derive(Debug, Clone, Serialize)]
pub struct SubjectAnalyticsView {
    pub subject: SubjectView,
    pub total_assignments: usize,
    pub graded_assignments: usize,
    pub average_grade: Option<f64>,
    pub grade_distribution: BTreeMap<String, usize>,
    pub status_distribution: BTreeMap<String, usize>,
    pub completion_rate: Option<f64>,
}

/// Headline counts for the assignments dashboard
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDashboardStats {
    pub total_assignments: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub need_grading_count: usize,
}

/// The cross-student assignments dashboard
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentsDashboardView {
    pub overdue_assignments: Vec<AssignmentView>,
    pub due_soon: Vec<AssignmentView>,
    pub need_grading: Vec<AssignmentView>,
    pub recent_activity: Vec<AssignmentView>,
    pub stats: AssignmentDashboardStats,
}
