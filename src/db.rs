use diesel::prelude::*;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use std::time::Duration;
use tracing::warn;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder().build(manager).expect("Failed to create pool.")
}

/// How many times a write is retried when SQLite reports the database as busy
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Delay between write attempts
const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Extension trait for executing a statement with retries on lock contention.
///
/// SQLite allows a single writer at a time; under concurrent requests an
/// insert or update can fail with "database is locked". Statements built from
/// `Clone` values can simply be re-executed after a short sleep.
pub trait ExecuteWithRetry: ExecuteDsl<SqliteConnection> + Clone {
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let mut attempt = 1;
        loop {
            match ExecuteDsl::execute(self.clone(), conn) {
                Err(DieselError::DatabaseError(_, info))
                    if info.message().contains("database is locked")
                        && attempt < MAX_WRITE_ATTEMPTS =>
                {
                    warn!("Database locked, retrying write (attempt {attempt})");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                result => return result,
            }
        }
    }
}

impl<T> ExecuteWithRetry for T where T: ExecuteDsl<SqliteConnection> + Clone {}
