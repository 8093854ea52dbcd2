//! Repository for the `titles` table and the `title_genres` join.

use medialog_core::types::DbId;
use sqlx::PgPool;

use crate::models::title::{CreateTitle, Title, TitleGenreRow, UpdateTitle};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, year, description, category_id, created_at, updated_at";

/// Provides CRUD operations for titles.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a new title, returning the created row. Genre links are set
    /// separately via [`TitleRepo::set_genres`].
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let query = format!(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, COALESCE($3, ''), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Title>(&query)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    /// Find a title by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM titles WHERE id = $1");
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all titles ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Title>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM titles ORDER BY name ASC");
        sqlx::query_as::<_, Title>(&query).fetch_all(pool).await
    }

    /// Update a title. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let query = format!(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a title. Returns `true` if the row was deleted. Reviews and
    /// genre links cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the title's genre links with the given genre ids.
    pub async fn set_genres(
        pool: &PgPool,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut *tx)
            .await?;
        for genre_id in genre_ids {
            sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
                .bind(title_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }

    /// Genres linked to a single title, ordered by genre name.
    pub async fn genre_rows_for(
        pool: &PgPool,
        title_id: DbId,
    ) -> Result<Vec<TitleGenreRow>, sqlx::Error> {
        sqlx::query_as::<_, TitleGenreRow>(
            "SELECT tg.title_id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = $1
             ORDER BY g.name ASC",
        )
        .bind(title_id)
        .fetch_all(pool)
        .await
    }

    /// All genre links across all titles, for assembling list responses
    /// without a per-title query.
    pub async fn list_genre_rows(pool: &PgPool) -> Result<Vec<TitleGenreRow>, sqlx::Error> {
        sqlx::query_as::<_, TitleGenreRow>(
            "SELECT tg.title_id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             ORDER BY tg.title_id ASC, g.name ASC",
        )
        .fetch_all(pool)
        .await
    }
}
