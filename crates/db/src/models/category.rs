//! Category entity model and DTOs.

use medialog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full category row from the `categories` table.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
}

/// Category representation for API responses; the slug is the stable
/// external key, the internal id is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
        }
    }
}

/// DTO for creating a new category.
#[derive(Debug)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
}
