//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.
//!
//! One nesting level deeper than reviews: the title must exist, the review
//! must belong to that title, and the comment must belong to that review --
//! each checked in path order before permissions, so a mismatched parent
//! chain is a 404 regardless of who asks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions::{evaluate, Operation, ResourceKind};
use medialog_core::types::DbId;
use medialog_db::models::comment::{Comment, CreateComment};
use medialog_db::models::review::Review;
use medialog_db::repositories::CommentRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

use super::reviews::find_review;
use super::titles::find_title;

/// Request body for comment creation and update. Parent and author are
/// stamped from the path and the authenticated caller, never from the body.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
///
/// List all comments under a review. Open to anonymous callers.
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    let review = resolve_parents(&state, title_id, review_id).await?;
    let data = CommentRepo::list_for_review(&state.pool, review.id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    let review = resolve_parents(&state, title_id, review_id).await?;
    let comment = find_comment(&state, comment_id, review.id).await?;
    Ok(Json(comment))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
///
/// Create a comment. Any authenticated user; the caller becomes the author.
pub async fn create_comment(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let review = resolve_parents(&state, title_id, review_id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Comment, Operation::Create, caller.as_ref(), None)?;
    let Some(user) = user else {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Authentication required".into(),
        )));
    };

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let create_dto = CreateComment {
        text: input.text,
        review_id: review.id,
        author_id: user.user_id,
    };
    let comment = CommentRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        author_id = user.user_id,
        "Comment created"
    );
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///
/// Update a comment's text. Author, moderator, or admin.
pub async fn update_comment(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<CommentRequest>,
) -> AppResult<Json<Comment>> {
    let review = resolve_parents(&state, title_id, review_id).await?;
    let comment = find_comment(&state, comment_id, review.id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(
        ResourceKind::Comment,
        Operation::Update,
        caller.as_ref(),
        Some(comment.author_id),
    )?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let updated = CommentRepo::update_text(&state.pool, comment.id, &input.text)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///
/// Delete a comment. Author, moderator, or admin. Returns 204 No Content.
pub async fn delete_comment(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = resolve_parents(&state, title_id, review_id).await?;
    let comment = find_comment(&state, comment_id, review.id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(
        ResourceKind::Comment,
        Operation::Delete,
        caller.as_ref(),
        Some(comment.author_id),
    )?;

    CommentRepo::delete(&state.pool, comment.id).await?;

    tracing::info!(comment_id, review_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the title/review parent chain from the path: the title must
/// exist and the review must belong to it.
async fn resolve_parents(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    find_title(state, title_id).await?;
    find_review(state, review_id, title_id).await
}

async fn find_comment(
    state: &AppState,
    comment_id: DbId,
    review_id: DbId,
) -> AppResult<Comment> {
    CommentRepo::find_in_review(&state.pool, comment_id, review_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))
}
