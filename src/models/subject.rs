use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a taught subject, owned by a user and unique by name per user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::subjects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Subject {
    /// Unique identifier for the subject (UUID v4 as string)
    id: String,

    /// The ID of the owning user
    user_id: String,

    name: String,

    description: Option<String>,

    /// Hex color code for UI display
    color: Option<String>,

    /// Soft-delete flag
    active: bool,

    created_at: NaiveDateTime,
}

impl Subject {
    /// Creates a new active subject owned by the given user
    pub fn new(user_id: String, name: String, description: Option<String>, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            description,
            color,
            active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the subject's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the owning user
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_color(&self) -> Option<String> {
        self.color.clone()
    }

    pub fn get_active(&self) -> bool {
        self.active
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }
}
