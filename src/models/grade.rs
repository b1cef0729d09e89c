use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RubricScores;

/// Represents the grade for an assignment (at most one per assignment).
///
/// Only the earned points are stored; the percentage and letter are derived
/// from `points_earned` and the assignment's `points_total` at read time,
/// never persisted.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::grades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Grade {
    /// Unique identifier for the grade (UUID v4 as string)
    id: String,

    /// The ID of the assignment this grade belongs to
    assignment_id: String,

    points_earned: f64,

    feedback: Option<String>,

    /// Per-criterion rubric scores
    rubric_scores: Option<RubricScores>,

    /// The ID of the user who graded the assignment
    graded_by: String,

    graded_at: NaiveDateTime,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Grade {
    /// Creates a new grade for an assignment
    pub fn new(
        assignment_id: String,
        points_earned: f64,
        feedback: Option<String>,
        rubric_scores: Option<RubricScores>,
        graded_by: String,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            assignment_id,
            points_earned,
            feedback,
            rubric_scores,
            graded_by,
            graded_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the grade's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the graded assignment
    pub fn get_assignment_id(&self) -> String {
        self.assignment_id.clone()
    }

    pub fn get_points_earned(&self) -> f64 {
        self.points_earned
    }

    pub fn get_feedback(&self) -> Option<String> {
        self.feedback.clone()
    }

    pub fn get_rubric_scores(&self) -> RubricScores {
        self.rubric_scores.clone().unwrap_or_default()
    }

    /// Gets the ID of the user who graded the assignment
    pub fn get_graded_by(&self) -> String {
        self.graded_by.clone()
    }

    pub fn get_graded_at_raw(&self) -> NaiveDateTime {
        self.graded_at
    }

    pub fn get_created_at_raw(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn get_updated_at_raw(&self) -> NaiveDateTime {
        self.updated_at
    }
}
