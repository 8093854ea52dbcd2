//! User entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// `role` is stored as text (constrained by `ck_users_role`); parse it into
/// [`medialog_core::roles::Role`] before comparing. Use [`UserResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub bio: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub bio: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            bio: user.bio,
        }
    }
}

/// DTO for creating a new user. Accounts are always created inactive; the
/// activation flow is the only writer of the active flag.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub role: String,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
}
