//! Handlers for `/titles/{title_id}/reviews`.
//!
//! The title named in the path is validated first: a missing parent is 404
//! before any permission question is asked. A review is only reachable
//! through its own title; the scoped repository lookup treats a review
//! reached through the wrong title as absent.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions::{evaluate, Operation, ResourceKind};
use medialog_core::types::DbId;
use medialog_db::models::review::{CreateReview, Review, UpdateReview};
use medialog_db::repositories::ReviewRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

use super::titles::find_title;

/// Request body for `POST /titles/{title_id}/reviews`.
///
/// `author` and `title` are never accepted from the payload; they are
/// stamped from the authenticated caller and the path.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "score must be between 1 and 10"))]
    pub score: i32,
}

/// Request body for `PATCH /titles/{title_id}/reviews/{review_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "score must be between 1 and 10"))]
    pub score: Option<i32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles/{title_id}/reviews
///
/// List all reviews under a title. Open to anonymous callers.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Review>>>> {
    find_title(&state, title_id).await?;
    let data = ReviewRepo::list_for_title(&state.pool, title_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Review>> {
    find_title(&state, title_id).await?;
    let review = find_review(&state, review_id, title_id).await?;
    Ok(Json(review))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// Create a review. Any authenticated user; the caller becomes the author.
pub async fn create_review(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let title = find_title(&state, title_id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Review, Operation::Create, caller.as_ref(), None)?;
    let Some(user) = user else {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Authentication required".into(),
        )));
    };

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let create_dto = CreateReview {
        text: input.text,
        score: input.score,
        title_id: title.id,
        author_id: user.user_id,
    };
    let review = ReviewRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(review_id = review.id, title_id, author_id = user.user_id, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Update a review. Author, moderator, or admin.
pub async fn update_review(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateReviewRequest>,
) -> AppResult<Json<Review>> {
    find_title(&state, title_id).await?;
    let review = find_review(&state, review_id, title_id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(
        ResourceKind::Review,
        Operation::Update,
        caller.as_ref(),
        Some(review.author_id),
    )?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let update_dto = UpdateReview {
        text: input.text,
        score: input.score,
    };
    let updated = ReviewRepo::update(&state.pool, review.id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Delete a review. Author, moderator, or admin. Returns 204 No Content.
pub async fn delete_review(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_title(&state, title_id).await?;
    let review = find_review(&state, review_id, title_id).await?;

    let caller = user.as_ref().map(|u| u.caller());
    evaluate(
        ResourceKind::Review,
        Operation::Delete,
        caller.as_ref(),
        Some(review.author_id),
    )?;

    ReviewRepo::delete(&state.pool, review.id).await?;

    tracing::info!(review_id, title_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_review(
    state: &AppState,
    review_id: DbId,
    title_id: DbId,
) -> AppResult<Review> {
    ReviewRepo::find_in_title(&state.pool, review_id, title_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))
}
