use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AchievementList;

/// An extracurricular activity for a student (sports, music, volunteering...)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::activities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Activity {
    /// Unique identifier for the activity (UUID v4 as string)
    id: String,

    /// The ID of the student this activity belongs to
    student_id: String,

    name: String,

    description: Option<String>,

    /// sports, music, art, volunteer, ...
    activity_type: Option<String>,

    start_date: Option<NaiveDate>,

    end_date: Option<NaiveDate>,

    /// Total hours spent across the activity
    hours_total: Option<f64>,

    achievements: Option<AchievementList>,

    notes: Option<String>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Activity {
    /// Creates a new activity for a student
    pub fn new(
        student_id: String,
        name: String,
        description: Option<String>,
        activity_type: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        hours_total: Option<f64>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            name,
            description,
            activity_type,
            start_date,
            end_date,
            hours_total,
            achievements: None,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the activity's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the student this activity belongs to
    pub fn get_student_id(&self) -> String {
        self.student_id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_activity_type(&self) -> Option<String> {
        self.activity_type.clone()
    }

    pub fn get_start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn get_end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn get_hours_total(&self) -> Option<f64> {
        self.hours_total
    }

    pub fn get_achievements(&self) -> AchievementList {
        self.achievements.clone().unwrap_or_default()
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
