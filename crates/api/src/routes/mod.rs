//! Route definitions, one module per resource.

pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/signup                                        signup (public)
/// /auth/token                                         confirmation -> tokens (public)
/// /auth/refresh                                       refresh (public)
///
/// /users                                              list (admin)
/// /users/me                                           get, patch, delete (self)
/// /users/{username}                                   get, patch, delete (admin)
///
/// /categories                                         list (public), create (admin)
/// /categories/{slug}                                  delete (admin)
/// /genres                                             list (public), create (admin)
/// /genres/{slug}                                      delete (admin)
///
/// /titles                                             list (public), create (admin)
/// /titles/{id}                                        get (public), patch, delete (admin)
/// /titles/{id}/reviews                                list (public), create (authed)
/// /titles/{id}/reviews/{id}                           get, patch, delete
/// /titles/{id}/reviews/{id}/comments                  list (public), create (authed)
/// /titles/{id}/reviews/{id}/comments/{id}             get, patch, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
}
