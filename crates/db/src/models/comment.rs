//! Comment entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full comment row from the `comments` table. A comment is reachable only
/// through its review (and transitively, that review's title).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub text: String,
    pub review_id: DbId,
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a comment. Parent and author come from the path and the
/// authenticated caller.
#[derive(Debug)]
pub struct CreateComment {
    pub text: String,
    pub review_id: DbId,
    pub author_id: DbId,
}
