use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Session, User};
use crate::schema::{sessions, users};
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, instrument};

/// Creates a login session for a user and returns it (its ID is the
/// cookie token)
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn create_session(pool: &DbPool, user_id: &str) -> Result<Session> {
    debug!("Creating session");

    let mut conn = pool.get()?;

    let new_session = Session::new(user_id.to_string());

    diesel::insert_into(sessions::table)
        .values(new_session.clone())
        .execute_with_retry(&mut conn)
        .await?;

    Ok(new_session)
}

/// Resolves a session token to its user, or None for unknown tokens
#[instrument(skip(pool, token))]
pub fn get_session_user(pool: &DbPool, token: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = sessions::table
        .inner_join(users::table)
        .filter(sessions::id.eq(token))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Deletes a session (logout). Unknown tokens are a no-op.
#[instrument(skip(pool, token))]
pub async fn delete_session(pool: &DbPool, token: &str) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::delete(sessions::table.find(token.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::{create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_session_round_trip() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "meg").await;

        let session = create_session(&pool, &user.get_id()).await.unwrap();

        let resolved = get_session_user(&pool, &session.get_id()).unwrap().unwrap();
        assert_eq!(resolved.get_id(), user.get_id());
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_none() {
        let pool = setup_test_db();
        assert!(get_session_user(&pool, "no-such-token").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_deletes_session() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "meg").await;

        let session = create_session(&pool, &user.get_id()).await.unwrap();
        delete_session(&pool, &session.get_id()).await.unwrap();

        assert!(get_session_user(&pool, &session.get_id()).unwrap().is_none());
    }
}
