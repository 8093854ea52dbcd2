//! Refresh-token session model and DTO.

use medialog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table. Holds only the SHA-256
/// hash of the refresh token, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
