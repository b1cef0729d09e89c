/// Derived-metrics layer
///
/// Pure, stateless computations over entity state. Every function here is a
/// total function of its arguments; anything date-relative takes an explicit
/// `today` so results are reproducible for a fixed input.
///
/// None of these values are ever persisted; they are recomputed on the way
/// out of every read.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Attendance, AttendanceStatus, AssignmentStatus, GoalStatus};

/// Rounds to two decimal places (grade percentages, GPA)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to one decimal place (rates and progress figures)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes a grade percentage from earned and total points.
///
/// Returns None when `points_total` is not positive; a percentage over an
/// empty assignment is undefined, not zero.
pub fn grade_percentage(points_earned: f64, points_total: i32) -> Option<f64> {
    if points_total <= 0 {
        return None;
    }
    Some(round2(points_earned / points_total as f64 * 100.0))
}

/// Maps a percentage onto the A+..F letter scale.
///
/// Band floors: 97/93/90/87/83/80/77/73/70/67/63/60.
pub fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 97.0 {
        "A+"
    } else if percentage >= 93.0 {
        "A"
    } else if percentage >= 90.0 {
        "A-"
    } else if percentage >= 87.0 {
        "B+"
    } else if percentage >= 83.0 {
        "B"
    } else if percentage >= 80.0 {
        "B-"
    } else if percentage >= 77.0 {
        "C+"
    } else if percentage >= 73.0 {
        "C"
    } else if percentage >= 70.0 {
        "C-"
    } else if percentage >= 67.0 {
        "D+"
    } else if percentage >= 63.0 {
        "D"
    } else if percentage >= 60.0 {
        "D-"
    } else {
        "F"
    }
}

/// Display color for a letter grade, keyed off the letter family
pub fn grade_color(letter: &str) -> &'static str {
    match letter.chars().next() {
        Some('A') => "#4CAF50",
        Some('B') => "#8BC34A",
        Some('C') => "#FF9800",
        Some('D') => "#FF5722",
        Some('F') => "#F44336",
        _ => "#666666",
    }
}

/// Whether an assignment is overdue: due in the past and still open
pub fn is_overdue(due_date: Option<NaiveDate>, status: AssignmentStatus, today: NaiveDate) -> bool {
    match due_date {
        Some(due) => due < today && !status.is_closed(),
        None => false,
    }
}

/// Signed day count from `today` until `target` (negative when past)
pub fn days_until(target: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    target.map(|date| (date - today).num_days())
}

/// Aggregate view over a set of attendance records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub partial_days: usize,
    pub total_hours: f64,
    /// present/total as a percentage; None when there are no records
    pub attendance_rate: Option<f64>,
}

/// Summarizes a set of attendance records.
///
/// The rate is undefined (None), not zero, over an empty record set.
pub fn attendance_summary(records: &[Attendance]) -> AttendanceSummary {
    let total_days = records.len();
    let present_days = records
        .iter()
        .filter(|r| r.get_status() == AttendanceStatus::Present)
        .count();
    let absent_days = records
        .iter()
        .filter(|r| r.get_status() == AttendanceStatus::Absent)
        .count();
    let partial_days = records
        .iter()
        .filter(|r| r.get_status() == AttendanceStatus::Partial)
        .count();
    let total_hours = records.iter().map(|r| r.get_hours()).sum();

    let attendance_rate = if total_days > 0 {
        Some(round1(present_days as f64 / total_days as f64 * 100.0))
    } else {
        None
    };

    AttendanceSummary {
        total_days,
        present_days,
        absent_days,
        partial_days,
        total_hours,
        attendance_rate,
    }
}

/// Attendance rate alone, when the full summary isn't needed
pub fn attendance_rate(records: &[Attendance]) -> Option<f64> {
    attendance_summary(records).attendance_rate
}

/// Applies a progress update to a goal: clamps into [0, 100] and
/// auto-completes an active goal that reaches 100.
pub fn apply_goal_progress(requested: i32, status: GoalStatus) -> (i32, GoalStatus) {
    let clamped = requested.clamp(0, 100);
    let status = if clamped >= 100 && status == GoalStatus::Active {
        GoalStatus::Completed
    } else {
        status
    };
    (clamped, status)
}

/// Whether a goal is overdue: target in the past and neither completed
/// nor cancelled
pub fn goal_is_overdue(target_date: Option<NaiveDate>, status: GoalStatus, today: NaiveDate) -> bool {
    if matches!(status, GoalStatus::Completed | GoalStatus::Cancelled) {
        return false;
    }
    match target_date {
        Some(target) => target < today,
        None => false,
    }
}

/// Display color for a goal status
pub fn goal_status_color(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Active => "#2196F3",
        GoalStatus::Completed => "#4CAF50",
        GoalStatus::Paused => "#FF9800",
        GoalStatus::Cancelled => "#F44336",
    }
}

/// Display color for a goal progress bar, stepped every 20 points
pub fn goal_progress_color(progress: i32) -> &'static str {
    if progress >= 80 {
        "#4CAF50"
    } else if progress >= 60 {
        "#8BC34A"
    } else if progress >= 40 {
        "#FF9800"
    } else if progress >= 20 {
        "#FF5722"
    } else {
        "#F44336"
    }
}

/// Display color for an attendance status
pub fn attendance_status_color(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "#4CAF50",
        AttendanceStatus::Absent => "#F44336",
        AttendanceStatus::Partial => "#FF9800",
    }
}

/// Inclusive length of a date range in days
pub fn period_duration_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

/// Progress through an academic period as a percentage.
///
/// 0 when the period is strictly in the future, 100 when strictly past,
/// otherwise elapsed/total clamped to 100 with one decimal.
pub fn period_progress(start_date: NaiveDate, end_date: NaiveDate, today: NaiveDate) -> f64 {
    if start_date > today {
        return 0.0;
    }
    if end_date < today {
        return 100.0;
    }
    let total_days = period_duration_days(start_date, end_date) as f64;
    let elapsed_days = ((today - start_date).num_days() + 1) as f64;
    round1(elapsed_days / total_days * 100.0).min(100.0)
}

/// Days left in a period: full length when future, 0 when past
pub fn period_remaining_days(start_date: NaiveDate, end_date: NaiveDate, today: NaiveDate) -> i64 {
    if end_date < today {
        0
    } else if start_date > today {
        period_duration_days(start_date, end_date)
    } else {
        (end_date - today).num_days()
    }
}

/// Mean of grade percentages, or None with no grades
pub fn gpa(percentages: &[f64]) -> Option<f64> {
    if percentages.is_empty() {
        return None;
    }
    Some(round2(percentages.iter().sum::<f64>() / percentages.len() as f64))
}

/// Age in whole years on the given day
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Derives the display status of an activity from its date range
pub fn activity_status(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> &'static str {
    match (start_date, end_date) {
        (_, Some(end)) if end < today => "completed",
        (Some(start), Some(end)) if start <= today && today <= end => "ongoing",
        (Some(start), None) if start <= today => "ongoing",
        (Some(start), _) if start > today => "upcoming",
        _ => "planned",
    }
}

/// Display color for a derived activity status
pub fn activity_status_color(status: &str) -> &'static str {
    match status {
        "completed" => "#4CAF50",
        "ongoing" => "#2196F3",
        "upcoming" => "#FF9800",
        "planned" => "#9E9E9E",
        _ => "#666666",
    }
}

/// Inclusive duration of an activity, when both ends are known
pub fn activity_duration_days(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Option<i64> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => Some((end - start).num_days() + 1),
        _ => None,
    }
}

/// Formats an hour count for display: "1 hour", "2 hours", "2.5 hours"
pub fn format_hours(hours: f64) -> String {
    let unit = if hours == 1.0 { "hour" } else { "hours" };
    if hours == hours.trunc() {
        format!("{} {}", hours as i64, unit)
    } else {
        format!("{} {}", hours, unit)
    }
}

/// Formats a byte count with binary-thousand units, one decimal
pub fn format_file_size(bytes: i32) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Lowercased extension of a file name, with the dot
pub fn file_extension(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    if dot == 0 || dot == file_name.len() - 1 {
        return None;
    }
    Some(file_name[dot..].to_lowercase())
}

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".txt", ".rtf"];

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Whether submitted file metadata describes an image
pub fn is_image_file(mime_type: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(mime) = mime_type {
        return mime.starts_with("image/");
    }
    file_name
        .and_then(file_extension)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether submitted file metadata describes a document
pub fn is_document_file(mime_type: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(mime) = mime_type {
        return DOCUMENT_MIME_TYPES.contains(&mime);
    }
    file_name
        .and_then(file_extension)
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
}
