//! Genre entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full genre row from the `genres` table.
#[derive(Debug, Clone, FromRow)]
pub struct Genre {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
}

/// Genre representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct GenreResponse {
    pub name: String,
    pub slug: String,
}

impl From<Genre> for GenreResponse {
    fn from(genre: Genre) -> Self {
        Self {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

/// DTO for creating a new genre.
#[derive(Debug)]
pub struct CreateGenre {
    pub name: String,
    pub slug: String,
}
