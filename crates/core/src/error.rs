use crate::types::DbId;

/// Domain error type. Every variant is a recoverable, client-facing outcome;
/// only `Internal` indicates a server-side fault.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found for entities addressed by an external string key
    /// (category/genre slug, username).
    #[error("Entity not found: {entity} '{key}'")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad confirmation code or unknown username at activation time.
    /// Kept separate from `Unauthorized` so clients can distinguish a failed
    /// activation attempt from a missing or expired bearer token.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
