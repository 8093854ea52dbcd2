//! Review entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full review row from the `reviews` table. The score is bounded to
/// [1, 10] by `ck_reviews_score` in addition to request validation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub text: String,
    pub score: i32,
    pub title_id: DbId,
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a review. `title_id` and `author_id` are stamped by the
/// handler from the path and the authenticated caller, never from the body.
#[derive(Debug)]
pub struct CreateReview {
    pub text: String,
    pub score: i32,
    pub title_id: DbId,
    pub author_id: DbId,
}

/// DTO for updating a review. Authorship and title binding are immutable.
#[derive(Debug, Default)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}
