use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attendance state for one school day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Partial,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Partial => "partial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "partial" => Some(AttendanceStatus::Partial),
            _ => None,
        }
    }
}

/// One attendance record, unique per (student, date)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::attendance)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attendance {
    /// Unique identifier for the record (UUID v4 as string)
    id: String,

    /// The ID of the student this record belongs to
    student_id: String,

    date: NaiveDate,

    /// present, absent, partial
    status: String,

    /// Schooling hours logged for the day
    hours: f64,

    notes: Option<String>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Attendance {
    /// Creates a new attendance record for a student and date
    pub fn new(
        student_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
        hours: f64,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            date,
            status: status.as_str().to_string(),
            hours,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the record's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the student this record belongs to
    pub fn get_student_id(&self) -> String {
        self.student_id.clone()
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    pub fn get_status_raw(&self) -> String {
        self.status.clone()
    }

    /// Gets the parsed status; unknown stored values count as absent
    pub fn get_status(&self) -> AttendanceStatus {
        AttendanceStatus::parse(&self.status).unwrap_or(AttendanceStatus::Absent)
    }

    pub fn get_hours(&self) -> f64 {
        self.hours
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn get_updated_at_raw(&self) -> NaiveDateTime {
        self.updated_at
    }
}
