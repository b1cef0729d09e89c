/// Repository module
///
/// This module provides the data access layer for the application.
///
/// Every function that touches an owned entity (students, subjects,
/// assignments, grades, submissions, attendance, goals, activities,
/// academic periods) takes the owning user's ID and applies the ownership
/// filter itself, directly or via a join through the owning chain. A row
/// the caller doesn't own is reported as absent, never as forbidden, so
/// handlers cannot leak existence across accounts by construction.

mod user_repo;
mod session_repo;
mod student_repo;
mod subject_repo;
mod assignment_repo;
mod grade_repo;
mod submission_repo;
mod attendance_repo;
mod goal_repo;
mod activity_repo;
mod period_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use session_repo::*;
pub use student_repo::*;
pub use subject_repo::*;
pub use assignment_repo::*;
pub use grade_repo::*;
pub use submission_repo::*;
pub use attendance_repo::*;
pub use goal_repo::*;
pub use activity_repo::*;
pub use period_repo::*;

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use crate::db::{self, DbPool};
    use crate::models::User;
    use diesel::connection::SimpleConnection;
    use diesel_migrations::MigrationHarness;

    /// Sets up a test database with migrations applied
    ///
    /// Uses a unique shared in-memory database for each test. Plain
    /// ":memory:" gives each pooled connection its own separate database,
    /// so migrations run on one connection wouldn't be visible on others.
    /// A unique URI with cache=shared makes all connections in this pool
    /// share one in-memory database while staying isolated from other tests.
    pub fn setup_test_db() -> Arc<DbPool> {
        let unique_id = uuid::Uuid::new_v4();
        let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
        let pool = db::init_pool(&database_url);

        let mut conn = pool.get().expect("Failed to get connection");

        // Enable foreign key constraints for SQLite
        conn.batch_execute("PRAGMA foreign_keys = ON").unwrap();

        let migrations = diesel_migrations::FileBasedMigrations::find_migrations_directory()
            .expect("Failed to find migrations directory");
        conn.run_pending_migrations(migrations)
            .expect("Failed to run migrations");

        Arc::new(pool)
    }

    /// Creates a user to own test fixtures
    pub async fn create_test_user(pool: &DbPool, username: &str) -> User {
        super::create_user(
            pool,
            User::new(
                username.to_string(),
                format!("{username}@example.com"),
                crate::auth::hash_password("password123"),
                "Test".to_string(),
                "User".to_string(),
                "UTC".to_string(),
                None,
            ),
        )
        .await
        .unwrap()
    }
}
