use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Preferences;

/// Represents a user account (a parent/teacher running a homeschool)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Login name, unique across all users
    username: String,

    /// Email address, unique across all users
    email: String,

    /// Salted password digest; never serialized into responses
    #[serde(skip_serializing, default)]
    password_hash: String,

    first_name: String,

    last_name: String,

    /// IANA timezone name, defaults to "UTC"
    timezone: String,

    /// Free-form UI preferences
    preferences: Option<Preferences>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl User {
    /// Creates a new user with a fresh ID and timestamps.
    ///
    /// `password_hash` must already be digested; this constructor never
    /// sees a cleartext password.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        timezone: String,
        preferences: Option<Preferences>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            first_name,
            last_name,
            timezone,
            preferences,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the user's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the user's login name
    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    /// Gets the user's email address
    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    /// Gets the stored password digest
    pub fn get_password_hash(&self) -> String {
        self.password_hash.clone()
    }

    pub fn get_first_name(&self) -> String {
        self.first_name.clone()
    }

    pub fn get_last_name(&self) -> String {
        self.last_name.clone()
    }

    /// Gets the user's full name, first name first
    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn get_timezone(&self) -> String {
        self.timezone.clone()
    }

    pub fn get_preferences(&self) -> Option<Preferences> {
        self.preferences.clone()
    }

    /// Gets the user's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
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
    fn test_user_new() {
        let user = User::new(
            "meg".to_string(),
            "meg@example.com".to_string(),
            "salt$digest".to_string(),
            "Meg".to_string(),
            "Murry".to_string(),
            "UTC".to_string(),
            None,
        );

        assert_eq!(user.get_username(), "meg");
        assert_eq!(user.get_full_name(), "Meg Murry");
        assert!(Uuid::parse_str(&user.get_id()).is_ok());
        assert_eq!(user.get_created_at_raw(), user.get_updated_at_raw());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "meg".to_string(),
            "meg@example.com".to_string(),
            "salt$digest".to_string(),
            "Meg".to_string(),
            "Murry".to_string(),
            "UTC".to_string(),
            None,
        );

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "meg");
    }
}
