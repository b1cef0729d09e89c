use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded academic period (year, semester, quarter or term)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::academic_periods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AcademicPeriod {
    /// Unique identifier for the period (UUID v4 as string)
    id: String,

    /// The ID of the owning user
    user_id: String,

    name: String,

    start_date: NaiveDate,

    /// Inclusive end of the period; never before `start_date`
    end_date: NaiveDate,

    /// year, semester, quarter, term
    period_type: String,

    active: bool,

    created_at: NaiveDateTime,
}

impl AcademicPeriod {
    /// Creates a new active academic period
    pub fn new(
        user_id: String,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period_type: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            start_date,
            end_date,
            period_type,
            active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the period's ID
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

    pub fn get_start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn get_end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn get_period_type(&self) -> String {
        self.period_type.clone()
    }

    pub fn get_active(&self) -> bool {
        self.active
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }
}
