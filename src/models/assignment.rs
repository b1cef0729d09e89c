use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StringList;

/// Lifecycle state of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Submitted,
    Graded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        }
    }

    /// Parses a wire-format status string, returning None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assigned" => Some(AssignmentStatus::Assigned),
            "in_progress" => Some(AssignmentStatus::InProgress),
            "submitted" => Some(AssignmentStatus::Submitted),
            "graded" => Some(AssignmentStatus::Graded),
            _ => None,
        }
    }

    /// Whether work on the assignment is finished (submitted or graded)
    pub fn is_closed(&self) -> bool {
        matches!(self, AssignmentStatus::Submitted | AssignmentStatus::Graded)
    }
}

/// Represents a piece of schoolwork assigned to a student
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Assignment {
    /// Unique identifier for the assignment (UUID v4 as string)
    id: String,

    /// The ID of the student this assignment belongs to
    student_id: String,

    /// Optional subject tag
    subject_id: Option<String>,

    title: String,

    description: Option<String>,

    instructions: Option<String>,

    due_date: Option<NaiveDate>,

    /// Estimated time to complete, in minutes
    estimated_duration: Option<i32>,

    /// Maximum points; the denominator for the grade percentage
    points_total: i32,

    /// homework, quiz, test, project
    assignment_type: String,

    /// easy, medium, hard
    difficulty_level: String,

    /// assigned, in_progress, submitted, graded
    status: String,

    /// low, normal, high
    priority: String,

    tags: Option<StringList>,

    resources: Option<StringList>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Assignment {
    /// Creates a new assignment in the `assigned` state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: String,
        subject_id: Option<String>,
        title: String,
        description: Option<String>,
        instructions: Option<String>,
        due_date: Option<NaiveDate>,
        estimated_duration: Option<i32>,
        points_total: i32,
        assignment_type: String,
        difficulty_level: String,
        priority: String,
        tags: Option<StringList>,
        resources: Option<StringList>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            subject_id,
            title,
            description,
            instructions,
            due_date,
            estimated_duration,
            points_total,
            assignment_type,
            difficulty_level,
            status: AssignmentStatus::Assigned.as_str().to_string(),
            priority,
            tags,
            resources,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the assignment's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the student this assignment belongs to
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

    pub fn get_instructions(&self) -> Option<String> {
        self.instructions.clone()
    }

    pub fn get_due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn get_estimated_duration(&self) -> Option<i32> {
        self.estimated_duration
    }

    pub fn get_points_total(&self) -> i32 {
        self.points_total
    }

    pub fn get_assignment_type(&self) -> String {
        self.assignment_type.clone()
    }

    pub fn get_difficulty_level(&self) -> String {
        self.difficulty_level.clone()
    }

    /// Gets the raw status string as stored
    pub fn get_status_raw(&self) -> String {
        self.status.clone()
    }

    /// Gets the parsed status; defaults to `Assigned` if the stored value is
    /// somehow unknown
    pub fn get_status(&self) -> AssignmentStatus {
        AssignmentStatus::parse(&self.status).unwrap_or(AssignmentStatus::Assigned)
    }

    pub fn get_priority(&self) -> String {
        self.priority.clone()
    }

    pub fn get_tags(&self) -> StringList {
        self.tags.clone().unwrap_or_default()
    }

    pub fn get_resources(&self) -> StringList {
        self.resources.clone().unwrap_or_default()
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn get_updated_at_raw(&self) -> NaiveDateTime {
        self.updated_at
    }
}
