//! Route definitions for the `/titles` resource.
//!
//! Also nests review routes under `/titles/{title_id}/reviews` and comment
//! routes one level deeper.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews, titles};
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET    /                                       -> list_titles (public)
/// POST   /                                       -> create_title (admin)
/// GET    /{id}                                   -> get_title (public)
/// PATCH  /{id}                                   -> update_title (admin)
/// DELETE /{id}                                   -> delete_title (admin)
///
/// GET    /{title_id}/reviews                     -> list_reviews (public)
/// POST   /{title_id}/reviews                     -> create_review (authed)
/// GET    /{title_id}/reviews/{review_id}         -> get_review (public)
/// PATCH  /{title_id}/reviews/{review_id}         -> update_review
/// DELETE /{title_id}/reviews/{review_id}         -> delete_review
///
/// GET    .../{review_id}/comments                -> list_comments (public)
/// POST   .../{review_id}/comments                -> create_comment (authed)
/// GET    .../comments/{comment_id}               -> get_comment (public)
/// PATCH  .../comments/{comment_id}               -> update_comment
/// DELETE .../comments/{comment_id}               -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    let comment_routes = Router::new()
        .route(
            "/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/{comment_id}",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        );

    let review_routes = Router::new()
        .route("/", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/{review_id}",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .nest("/{review_id}/comments", comment_routes);

    Router::new()
        .route("/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/{id}",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        .nest("/{title_id}/reviews", review_routes)
}
