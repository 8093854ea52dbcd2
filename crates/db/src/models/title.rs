//! Title entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::category::CategoryResponse;
use crate::models::genre::GenreResponse;

/// Full title row from the `titles` table.
///
/// `category_id` is nullable: deleting a category nulls the reference
/// (`ON DELETE SET NULL`) rather than cascading into the titles.
#[derive(Debug, Clone, FromRow)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Title representation for API responses: nests the category object and
/// the genre list instead of exposing raw foreign keys.
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category: Option<CategoryResponse>,
    pub genre: Vec<GenreResponse>,
}

/// DTO for creating a new title. Category and genres are resolved from
/// slugs to ids by the handler before this reaches the repository.
#[derive(Debug)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
}

/// DTO for updating an existing title. All fields are optional; an absent
/// field leaves the stored value unchanged.
#[derive(Debug, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
}

/// One row of the title/genre join, used to assemble [`TitleResponse`]
/// genre lists without an N+1 query per title.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenreRow {
    pub title_id: DbId,
    pub name: String,
    pub slug: String,
}
