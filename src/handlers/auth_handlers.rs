use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::{self, CurrentUser, SESSION_COOKIE};
use crate::db::DbPool;
use crate::dto::{require_field, ChangePasswordDto, LoginDto, RegisterDto, UpdateUserDto};
use crate::errors::ApiError;
use crate::models::{Preferences, User};
use crate::repo;
use crate::views::{AuthResponse, MessageResponse, UserView};

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// Handler for registering a new user
///
/// This function handles POST requests to `/auth/register`. The new account
/// is logged in immediately: the response carries the session cookie.
#[instrument(skip(pool, jar, payload))]
pub async fn register_handler(
    State(pool): State<Arc<DbPool>>,
    jar: CookieJar,
    Json(payload): Json<RegisterDto>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    info!("Registering new user");

    let username = require_field(payload.username, "username")?;
    let email = require_field(payload.email, "email")?;
    let password = require_field(payload.password, "password")?;
    let first_name = require_field(payload.first_name, "first_name")?;
    let last_name = require_field(payload.last_name, "last_name")?;

    if repo::username_exists(&pool, &username).map_err(ApiError::Database)? {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }
    if repo::email_exists(&pool, &email, None).map_err(ApiError::Database)? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let user = repo::create_user(
        &pool,
        User::new(
            username,
            email,
            auth::hash_password(&password),
            first_name,
            last_name,
            payload.timezone.unwrap_or_else(|| "UTC".to_string()),
            payload.preferences.map(Preferences),
        ),
    )
    .await
    .map_err(ApiError::Database)?;

    let session = repo::create_session(&pool, &user.get_id())
        .await
        .map_err(ApiError::Database)?;

    info!("Successfully registered user with id: {}", user.get_id());

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(session.get_id())),
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserView::from_user(&user),
        }),
    ))
}

/// Handler for logging in
///
/// This function handles POST requests to `/auth/login`. The login name
/// may be a username or an email address.
#[instrument(skip(pool, jar, payload))]
pub async fn login_handler(
    State(pool): State<Arc<DbPool>>,
    jar: CookieJar,
    Json(payload): Json<LoginDto>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (Some(login), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    let user = repo::get_user_by_login(&pool, &login)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&user.get_password_hash(), &password) {
        return Err(ApiError::InvalidCredentials);
    }

    let session = repo::create_session(&pool, &user.get_id())
        .await
        .map_err(ApiError::Database)?;

    info!("User {} logged in", user.get_id());

    Ok((
        jar.add(session_cookie(session.get_id())),
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: UserView::from_user(&user),
        }),
    ))
}

/// Handler for logging out
///
/// This function handles POST requests to `/auth/logout`. The session row
/// is deleted and the cookie cleared.
#[instrument(skip(pool, jar, user))]
pub async fn logout_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        repo::delete_session(&pool, cookie.value())
            .await
            .map_err(ApiError::Database)?;
    }

    info!("User {} logged out", user.id());

    Ok((
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(MessageResponse::new("Logout successful")),
    ))
}

/// Handler for fetching the current user's account
///
/// This function handles GET requests to `/auth/me`.
#[instrument(skip(user))]
pub async fn me_handler(user: CurrentUser) -> Json<UserView> {
    Json(UserView::from_user(&user.0))
}

/// Handler for updating the current user's account
///
/// This function handles PUT requests to `/auth/me`. Only fields present
/// in the payload are changed.
#[instrument(skip(pool, user, payload))]
pub async fn update_me_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<UpdateUserDto>,
) -> Result<Json<UserView>, ApiError> {
    debug!("Updating current user");

    if let Some(email) = &payload.email {
        if repo::email_exists(&pool, email, Some(&user.id())).map_err(ApiError::Database)? {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }
    }

    let updated = repo::update_user(
        &pool,
        &user.id(),
        payload.first_name,
        payload.last_name,
        payload.email,
        payload.timezone,
        payload.preferences.map(Preferences),
    )
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(UserView::from_user(&updated)))
}

/// Handler for changing the current user's password
///
/// This function handles POST requests to `/auth/change-password`.
#[instrument(skip_all)]
pub async fn change_password_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(current_password), Some(new_password)) =
        (payload.current_password, payload.new_password)
    else {
        return Err(ApiError::Validation(
            "Current password and new password are required".to_string(),
        ));
    };

    if !auth::verify_password(&user.0.get_password_hash(), &current_password) {
        return Err(ApiError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    if new_password.len() < 6 {
        return Err(ApiError::Validation(
            "New password must be at least 6 characters long".to_string(),
        ));
    }

    repo::update_password(&pool, &user.id(), auth::hash_password(&new_password))
        .await
        .map_err(ApiError::Database)?;

    info!("User {} changed password", user.id());

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Handler for fetching a user account by ID
///
/// This function handles GET requests to `/users/{id}`. Accounts are only
/// visible to themselves; anything else is a 403.
#[instrument(skip(pool, user), fields(user_id = %user_id))]
pub async fn get_user_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    if user.id() != user_id {
        return Err(ApiError::Forbidden);
    }

    let account = repo::get_user(&pool, &user_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UserView::from_user(&account)))
}

/// Handler for deleting a user account
///
/// This function handles DELETE requests to `/users/{id}`. Accounts can
/// only delete themselves; everything they own goes with them.
#[instrument(skip(pool, user, jar), fields(user_id = %user_id))]
pub async fn delete_user_handler(
    State(pool): State<Arc<DbPool>>,
    user: CurrentUser,
    jar: CookieJar,
    Path(user_id): Path<String>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if user.id() != user_id {
        return Err(ApiError::Forbidden);
    }

    repo::delete_user(&pool, &user_id).map_err(ApiError::Database)?;

    info!("Deleted user account {}", user_id);

    Ok((
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(MessageResponse::new("Account deleted successfully")),
    ))
}
