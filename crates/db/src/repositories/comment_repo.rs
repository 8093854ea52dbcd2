//! Repository for the `comments` table.
//!
//! Mirrors the review repository one nesting level deeper: single-row
//! lookups are scoped to the parent review.

use medialog_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, text, review_id, author_id, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (text, review_id, author_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(&input.text)
            .bind(input.review_id)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    /// List all comments under a review, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE review_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .fetch_all(pool)
            .await
    }

    /// Find a comment by id, but only if it belongs to the given review.
    pub async fn find_in_review(
        pool: &PgPool,
        id: DbId,
        review_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 AND review_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a comment's text.
    pub async fn update_text(
        pool: &PgPool,
        id: DbId,
        text: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET text = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(text)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment. Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
