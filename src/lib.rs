/// Homeroom: a homeschool management backend
///
/// This library provides the core functionality for a homeschool management
/// system: user accounts, student profiles, subjects, assignments, grades,
/// submissions, attendance, goals, activities and academic periods, exposed
/// as a JSON API behind session-cookie authentication and backed by SQLite.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Data structures representing the entities
/// - `repo`: Ownership-scoped repository layer for database operations
/// - `schema`: Database schema definitions
/// - `metrics`: Pure derived-field computations
/// - `views`: Response shaping (row + derived fields)
/// - `handlers`: Web API handlers
/// - `auth`: Password digests and the session-cookie extractor
/// - `config`: Configuration loading
///
/// ### Web API
///
/// All endpoints live under the `/api` prefix; apart from registration,
/// login and the health check, every route requires the session cookie.

/// Authentication module
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Request payload types and validation helpers
pub mod dto;

/// API error taxonomy
pub mod errors;

/// Web API handlers module
pub mod handlers;

/// Derived-metrics module
pub mod metrics;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Response shaping module
pub mod views;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use handlers::*;

/// Creates the application router with all routes
///
/// This function sets up the Axum router with all the API endpoints under
/// the `/api` prefix.
///
/// ### Arguments
///
/// * `pool` - The database connection pool to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the database pool as state
pub fn create_app(pool: Arc<db::DbPool>) -> Router {
    let api = Router::new()
        // Health probe
        .route("/health", get(health_handler))
        // Session lifecycle
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler).put(update_me_handler))
        .route("/auth/change-password", post(change_password_handler))
        // Accounts are visible to themselves only
        .route("/users/{id}", get(get_user_handler).delete(delete_user_handler))
        // Students and their nested resources
        .route("/students", get(list_students_handler).post(create_student_handler))
        .route(
            "/students/{id}",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler),
        )
        .route("/students/{id}/dashboard", get(student_dashboard_handler))
        .route("/students/{id}/assignments", get(student_assignments_handler))
        .route("/students/{id}/grades", get(student_grades_handler))
        .route("/students/{id}/progress", get(student_progress_handler))
        .route(
            "/students/{id}/attendance",
            get(list_attendance_handler).post(create_attendance_handler),
        )
        .route(
            "/students/{id}/goals",
            get(list_goals_handler).post(create_goal_handler),
        )
        .route(
            "/students/{id}/activities",
            get(list_activities_handler).post(create_activity_handler),
        )
        // Flat routes for mutating nested rows by their own IDs
        .route(
            "/attendance/{id}",
            put(update_attendance_handler).delete(delete_attendance_handler),
        )
        .route(
            "/goals/{id}",
            get(get_goal_handler).put(update_goal_handler).delete(delete_goal_handler),
        )
        .route(
            "/activities/{id}",
            put(update_activity_handler).delete(delete_activity_handler),
        )
        .route("/activities/{id}/achievements", post(add_achievement_handler))
        // Subjects
        .route("/subjects", get(list_subjects_handler).post(create_subject_handler))
        .route(
            "/subjects/{id}",
            get(get_subject_handler)
                .put(update_subject_handler)
                .delete(delete_subject_handler),
        )
        .route("/subjects/{id}/assignments", get(subject_assignments_handler))
        .route("/subjects/{id}/analytics", get(subject_analytics_handler))
        // Assignments, their grade and their submissions
        .route(
            "/assignments",
            get(list_assignments_handler).post(create_assignment_handler),
        )
        .route("/assignments/dashboard", get(assignments_dashboard_handler))
        .route(
            "/assignments/{id}",
            get(get_assignment_handler)
                .put(update_assignment_handler)
                .delete(delete_assignment_handler),
        )
        .route(
            "/assignments/{id}/grade",
            post(grade_assignment_handler)
                .get(get_grade_handler)
                .put(update_grade_handler)
                .delete(delete_grade_handler),
        )
        .route(
            "/assignments/{id}/submissions",
            get(list_submissions_handler).post(create_submission_handler),
        )
        // Academic periods
        .route("/periods", get(list_periods_handler).post(create_period_handler))
        .route(
            "/periods/{id}",
            get(get_period_handler)
                .put(update_period_handler)
                .delete(delete_period_handler),
        )
        // Add the database pool to the application state
        .with_state(pool);

    Router::new().nest("/api", api)
}

/// Runs the embedded migrations
///
/// This function applies all database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Panics
///
/// This function will panic if the migrations fail to run
pub fn run_migrations(conn: &mut diesel::SqliteConnection) {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::{Connection, RunQueryDsl, SqliteConnection};

    /// Migrations create the expected tables
    #[test]
    fn test_run_migrations() {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();

        run_migrations(&mut conn);

        for table in [
            "users",
            "sessions",
            "students",
            "subjects",
            "assignments",
            "grades",
            "submissions",
            "attendance",
            "academic_periods",
            "goals",
            "activities",
        ] {
            let result = diesel::sql_query(format!(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='{table}'"
            ))
            .execute(&mut conn);
            assert!(result.is_ok(), "table {table} missing");
        }
    }
}
