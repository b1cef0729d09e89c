use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ApiError;

/// Wire format for all dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Pulls a required string field out of a payload.
///
/// Missing, null and empty values are all rejected the same way, with a
/// field-specific message.
pub fn require_field(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

/// Pulls a required non-string field out of a payload
pub fn require_value<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

/// Parses a `YYYY-MM-DD` date, rejecting anything else with a 400
pub fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ApiError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

/// Parses an optional date field; absent stays absent
pub fn parse_date_option(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    value.map(parse_date).transpose()
}

/// Data transfer object for registering a new user
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RegisterDto {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub timezone: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Data transfer object for logging in.
///
/// `username` also accepts the account's email address.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LoginDto {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Partial update for the current user's account
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateUserDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Data transfer object for changing the current user's password
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ChangePasswordDto {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Data transfer object for creating a new student
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateStudentDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Date of birth in `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub grade_level: Option<String>,
    pub student_code: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for a student; absent fields are left untouched
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateStudentDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub grade_level: Option<String>,
    pub student_code: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

/// Data transfer object for creating a new subject
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateSubjectDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update for a subject
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateSubjectDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub active: Option<bool>,
}

/// Data transfer object for creating a new assignment
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateAssignmentDto {
    pub student_id: Option<String>,
    pub subject_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Due date in `YYYY-MM-DD`
    pub due_date: Option<String>,
    /// Estimated time to complete, in minutes
    pub estimated_duration: Option<i32>,
    pub points_total: Option<i32>,
    pub assignment_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
}

/// Partial update for an assignment
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateAssignmentDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<String>,
    pub estimated_duration: Option<i32>,
    pub points_total: Option<i32>,
    pub assignment_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
}

/// Data transfer object for grading an assignment
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct GradeAssignmentDto {
    pub points_earned: Option<f64>,
    pub feedback: Option<String>,
    pub rubric_scores: Option<BTreeMap<String, f64>>,
}

/// Partial update for an existing grade
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateGradeDto {
    pub points_earned: Option<f64>,
    pub feedback: Option<String>,
    pub rubric_scores: Option<BTreeMap<String, f64>>,
}

/// Data transfer object for recording a submission's file metadata
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateSubmissionDto {
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub notes: Option<String>,
}

/// Data transfer object for recording one day of attendance
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateAttendanceDto {
    /// The school day in `YYYY-MM-DD`
    pub date: Option<String>,
    /// present, absent or partial; defaults to present
    pub status: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

/// Partial update for an attendance record
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateAttendanceDto {
    pub date: Option<String>,
    pub status: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

/// Data transfer object for creating a goal
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateGoalDto {
    pub subject_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<String>,
    pub goal_type: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for a goal
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateGoalDto {
    pub subject_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<String>,
    pub goal_type: Option<String>,
    pub status: Option<String>,
    pub progress_percentage: Option<i32>,
    pub notes: Option<String>,
}

/// Data transfer object for creating an activity
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateActivityDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub hours_total: Option<f64>,
    pub notes: Option<String>,
}

/// Partial update for an activity
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateActivityDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub hours_total: Option<f64>,
    pub notes: Option<String>,
}

/// Data transfer object for appending an achievement to an activity
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AddAchievementDto {
    pub title: Option<String>,
}

/// Data transfer object for creating an academic period
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreatePeriodDto {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period_type: Option<String>,
}

/// Partial update for an academic period
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdatePeriodDto {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period_type: Option<String>,
    pub active: Option<bool>,
}

/// Query-string filters for assignment listings
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct AssignmentFilterQuery {
    pub student_id: Option<String>,
    pub subject_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Query-string date bounds for attendance listings
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query-string filter for goal listings
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct GoalFilterQuery {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_rejects_missing_and_empty() {
        assert!(require_field(None, "first_name").is_err());
        assert!(require_field(Some("".to_string()), "first_name").is_err());
        assert!(require_field(Some("   ".to_string()), "first_name").is_err());
        assert_eq!(require_field(Some("Meg".to_string()), "first_name").unwrap(), "Meg");
    }

    #[test]
    fn test_require_field_message_names_the_field() {
        let err = require_field(None, "grade_level").unwrap_err();
        assert_eq!(err.to_string(), "grade_level is required");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2010-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert!(parse_date("01/01/2010").is_err());
        assert!(parse_date("2010-13-01").is_err());
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn test_parse_date_option_passes_through_absent() {
        assert_eq!(parse_date_option(None).unwrap(), None);
        assert!(parse_date_option(Some("bogus")).is_err());
    }
}
