/// Authentication support
///
/// Passwords are stored as `salt$digest` where the digest is SHA-256 over
/// salt + password. Logins create a server-side session row whose ID is the
/// opaque token carried by the session cookie.
///
/// `CurrentUser` is the authorization entry point for every protected
/// handler: extracting it either yields the authenticated user or rejects
/// the request with 401 before the handler body runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::ApiError;
use crate::models::User;
use crate::repo;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "homeroom_session";

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hashes a cleartext password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest_with_salt(&salt, password))
}

/// Checks a cleartext password against a stored `salt$digest` value
pub fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => digest_with_salt(salt, password) == digest,
        None => false,
    }
}

/// The authenticated user for the current request.
///
/// Resolved from the session cookie against the sessions table; a missing
/// cookie, an unknown token, or a token whose user has been deleted all
/// reject with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Gets the authenticated user's ID
    pub fn id(&self) -> String {
        self.0.get_id()
    }
}

impl FromRequestParts<Arc<DbPool>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<DbPool>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthenticated)?;

        let token = jar
            .get(SESSION_COOKIE)
            .ok_or(ApiError::Unauthenticated)?
            .value()
            .to_string();

        let user = repo::get_session_user(state, &token)
            .map_err(ApiError::Database)?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let stored = hash_password("password123");
        assert!(verify_password(&stored, "password123"));
        assert!(!verify_password(&stored, "password124"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("password123");
        let b = hash_password("password123");
        // Same password, different salt, different digest
        assert_ne!(a, b);
        assert!(verify_password(&a, "password123"));
        assert!(verify_password(&b, "password123"));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_value() {
        assert!(!verify_password("not-a-valid-entry", "password123"));
        assert!(!verify_password("", "password123"));
    }
}
