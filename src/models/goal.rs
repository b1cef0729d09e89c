use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
            GoalStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(GoalStatus::Active),
            "completed" => Some(GoalStatus::Completed),
            "paused" => Some(GoalStatus::Paused),
            "cancelled" => Some(GoalStatus::Cancelled),
            _ => None,
        }
    }
}

/// A learning goal for a student, optionally tied to a subject
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Goal {
    /// Unique identifier for the goal (UUID v4 as string)
    id: String,

    /// The ID of the student this goal belongs to
    student_id: String,

    subject_id: Option<String>,

    title: String,

    description: Option<String>,

    target_date: Option<NaiveDate>,

    /// academic, behavioral, skill
    goal_type: String,

    /// active, completed, paused, cancelled
    status: String,

    /// Progress toward completion; always within [0, 100]
    progress_percentage: i32,

    notes: Option<String>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Goal {
    /// Creates a new active goal with zero progress
    pub fn new(
        student_id: String,
        subject_id: Option<String>,
        title: String,
        description: Option<String>,
        target_date: Option<NaiveDate>,
        goal_type: String,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            subject_id,
            title,
            description,
            target_date,
            goal_type,
            status: GoalStatus::Active.as_str().to_string(),
            progress_percentage: 0,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the goal's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the student this goal belongs to
    pub fn get_student_id(&self) -> String {
        self.student_id.clone()
    }

    pub fn get_subject_id(&self) -> Option<String> {
        self.subject_id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    pub fn get_goal_type(&self) -> String {
        self.goal_type.clone()
    }

    pub fn get_status_raw(&self) -> String {
        self.status.clone()
    }

    /// Gets the parsed status; unknown stored values count as active
    pub fn get_status(&self) -> GoalStatus {
        GoalStatus::parse(&self.status).unwrap_or(GoalStatus::Active)
    }

    pub fn get_progress_percentage(&self) -> i32 {
        self.progress_percentage
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
