use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents one handed-in piece of work for an assignment.
///
/// Only file metadata is stored; the file itself lives on disk at
/// `file_path` and is never read by the API beyond an existence probe.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::submissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Submission {
    /// Unique identifier for the submission (UUID v4 as string)
    id: String,

    /// The ID of the assignment this submission belongs to
    assignment_id: String,

    submitted_at: NaiveDateTime,

    file_path: Option<String>,

    file_name: Option<String>,

    /// File size in bytes
    file_size: Option<i32>,

    mime_type: Option<String>,

    notes: Option<String>,

    /// submitted, reviewed, returned
    status: String,

    created_at: NaiveDateTime,
}

impl Submission {
    /// Creates a new submission in the `submitted` state
    pub fn new(
        assignment_id: String,
        file_path: Option<String>,
        file_name: Option<String>,
        file_size: Option<i32>,
        mime_type: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            assignment_id,
            submitted_at: now,
            file_path,
            file_name,
            file_size,
            mime_type,
            notes,
            status: "submitted".to_string(),
            created_at: now,
        }
    }

    /// Gets the submission's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the assignment this submission belongs to
    pub fn get_assignment_id(&self) -> String {
        self.assignment_id.clone()
    }

    pub fn get_submitted_at_raw(&self) -> NaiveDateTime {
        self.submitted_at
    }

    pub fn get_file_path(&self) -> Option<String> {
        self.file_path.clone()
    }

    pub fn get_file_name(&self) -> Option<String> {
        self.file_name.clone()
    }

    pub fn get_file_size(&self) -> Option<i32> {
        self.file_size
    }

    pub fn get_mime_type(&self) -> Option<String> {
        self.mime_type.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_status(&self) -> String {
        self.status.clone()
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }
}
