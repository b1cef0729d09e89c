use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-side login session backing the session cookie.
///
/// The row ID doubles as the opaque token stored in the cookie; a session
/// lives until logout deletes it.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    id: String,

    user_id: String,

    created_at: NaiveDateTime,
}

impl Session {
    /// Creates a new session for a user with a fresh random token
    pub fn new(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the session token
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user this session belongs to
    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }
}
