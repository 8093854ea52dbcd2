//! Route definitions for the `/users` resource.
//!
//! `/me` is a static segment and wins over the `/{username}` capture, which
//! is also why "me" is a reserved username.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /               -> list_users (admin)
/// GET    /me             -> get_me
/// PATCH  /me             -> update_me
/// DELETE /me             -> delete_me
/// GET    /{username}     -> get_user (admin)
/// PATCH  /{username}     -> update_user (admin)
/// DELETE /{username}     -> delete_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route(
            "/me",
            get(users::get_me)
                .patch(users::update_me)
                .delete(users::delete_me),
        )
        .route(
            "/{username}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
