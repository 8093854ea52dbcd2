//! Role-gated extractor for the user-administration surface.
//!
//! Resource routes (catalog, reviews, comments) go through
//! `medialog_core::permissions::evaluate` in their handlers instead; this
//! extractor exists for the `/users` routes, which sit outside that table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medialog_core::permissions;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        permissions::require_admin(&user.caller())?;
        Ok(RequireAdmin(user))
    }
}
