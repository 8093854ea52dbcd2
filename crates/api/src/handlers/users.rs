//! Handlers for the `/users` resource: admin user management plus the
//! self-service `/users/me` routes.
//!
//! The role field is the one place self-escalation could happen, so it is
//! filtered through `permissions::may_assign_role` before ever reaching the
//! repository: a non-admin PATCHing their own profile has `role` silently
//! dropped from the update.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions;
use medialog_core::roles::Role;
use medialog_db::models::user::{UpdateUser, User, UserResponse};
use medialog_db::repositories::UserRepo;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Username that aliases the authenticated caller in `/users/me`; no account
/// may ever claim it.
pub const RESERVED_USERNAME: &str = "me";

/// Characters permitted in usernames: ASCII letters, digits, and `@.+-_`.
pub fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150), custom(function = validate_username_charset))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// List all users. Admin only.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/users/{username}
///
/// Get a single user by username. Admin only.
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/{username}
///
/// Update a user's fields, including the role. Admin only.
pub async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let target = find_user(&state, &username).await?;
    let update_dto = build_update(input, true)?;
    apply_update(&state, &target, update_dto).await
}

/// DELETE /api/v1/users/{username}
///
/// Delete a user. Admin only. Returns 204 No Content.
pub async fn delete_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    let target = find_user(&state, &username).await?;
    UserRepo::delete(&state.pool, target.id).await?;
    tracing::info!(user_id = target.id, username = %target.username, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Self-service handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = find_self(&state, &auth).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/me
///
/// Update the caller's own profile. The `role` field is ignored unless the
/// caller already holds the admin role.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let target = find_self(&state, &auth).await?;

    let may_assign = permissions::may_assign_role(&auth.caller());
    if input.role.is_some() && !may_assign {
        tracing::debug!(user_id = auth.user_id, "Ignoring role field in self-service update");
    }
    let update_dto = build_update(input, may_assign)?;
    apply_update(&state, &target, update_dto).await
}

/// DELETE /api/v1/users/me
///
/// Delete the caller's own account. Returns 204 No Content.
pub async fn delete_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    let target = find_self(&state, &auth).await?;
    UserRepo::delete(&state.pool, target.id).await?;
    tracing::info!(user_id = target.id, "User deleted own account");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "User",
                key: username.to_string(),
            })
        })
}

/// Resolve the bearer token's subject to a user row. A valid token whose
/// subject no longer exists is an authentication failure, not a 404.
async fn find_self(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

/// Validate the request body and turn it into a repository DTO, dropping the
/// role field when the caller may not assign roles.
fn build_update(input: UpdateUserRequest, may_assign_role: bool) -> AppResult<UpdateUser> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if input.username.as_deref() == Some(RESERVED_USERNAME) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Username '{RESERVED_USERNAME}' is reserved"
        ))));
    }

    let role = match (input.role, may_assign_role) {
        (Some(role), true) => {
            // Reject anything outside the closed role set before it reaches
            // the ck_users_role constraint.
            let parsed: Role = role.parse().map_err(AppError::Core)?;
            Some(parsed.as_str().to_string())
        }
        _ => None,
    };

    Ok(UpdateUser {
        username: input.username,
        email: input.email,
        role,
        bio: input.bio,
    })
}

async fn apply_update(
    state: &AppState,
    target: &User,
    update_dto: UpdateUser,
) -> AppResult<Json<UserResponse>> {
    let updated = UserRepo::update(&state.pool, target.id, &update_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Core(CoreError::Conflict(
                    "Username or email already taken".into(),
                ))
            } else {
                AppError::Database(e)
            }
        })?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: target.id,
        }))?;

    Ok(Json(updated.into()))
}
