//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;

use validator::ValidationError;

/// Characters permitted in category/genre slugs: lowercase ASCII letters,
/// digits, hyphens, and underscores.
pub(crate) fn validate_slug_charset(slug: &str) -> Result<(), ValidationError> {
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("slug_charset"))
    }
}
