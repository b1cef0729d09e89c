use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a student profile belonging to a user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    /// Unique identifier for the student (UUID v4 as string)
    id: String,

    /// The ID of the owning user
    user_id: String,

    first_name: String,

    last_name: String,

    date_of_birth: NaiveDate,

    /// Free-form grade level, e.g. "5" or "K"
    grade_level: String,

    /// Optional custom student identifier, unique when present
    student_code: Option<String>,

    /// Path to a profile image
    profile_picture: Option<String>,

    notes: Option<String>,

    /// Soft-delete flag; inactive students are hidden from listings
    active: bool,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Student {
    /// Creates a new active student owned by the given user
    pub fn new(
        user_id: String,
        first_name: String,
        last_name: String,
        date_of_birth: NaiveDate,
        grade_level: String,
        student_code: Option<String>,
        profile_picture: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            first_name,
            last_name,
            date_of_birth,
            grade_level,
            student_code,
            profile_picture,
            notes,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the student's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the owning user
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_first_name(&self) -> String {
        self.first_name.clone()
    }

    pub fn get_last_name(&self) -> String {
        self.last_name.clone()
    }

    /// Gets the student's full name, first name first
    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn get_date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn get_grade_level(&self) -> String {
        self.grade_level.clone()
    }

    pub fn get_student_code(&self) -> Option<String> {
        self.student_code.clone()
    }

    pub fn get_profile_picture(&self) -> Option<String> {
        self.profile_picture.clone()
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_active(&self) -> bool {
        self.active
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn get_updated_at_raw(&self) -> NaiveDateTime {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_new() {
        let student = Student::new(
            "user-1".to_string(),
            "Charles".to_string(),
            "Wallace".to_string(),
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            "5".to_string(),
            None,
            None,
            None,
        );

        assert_eq!(student.get_full_name(), "Charles Wallace");
        assert!(student.get_active());
        assert!(Uuid::parse_str(&student.get_id()).is_ok());
    }
}
