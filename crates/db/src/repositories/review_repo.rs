//! Repository for the `reviews` table.
//!
//! All single-row lookups are scoped to a title: a review is only reachable
//! through the title named in the request path.

use medialog_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, UpdateReview};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, text, score, title_id, author_id, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (text, score, title_id, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&input.text)
            .bind(input.score)
            .bind(input.title_id)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    /// List all reviews under a title, oldest first.
    pub async fn list_for_title(pool: &PgPool, title_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE title_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .fetch_all(pool)
            .await
    }

    /// Find a review by id, but only if it belongs to the given title.
    /// A review reached through the wrong title path is treated as absent.
    pub async fn find_in_title(
        pool: &PgPool,
        id: DbId,
        title_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1 AND title_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a review's text/score. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET
                text = COALESCE($2, text),
                score = COALESCE($3, score),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_optional(pool)
            .await
    }

    /// Delete a review. Returns `true` if the row was deleted. Comments
    /// cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
