//! Handlers for the `/genres` resource.
//!
//! Same shape as categories: open reads ordered by name, admin-only writes,
//! slug as the external key.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions::{evaluate, Operation, ResourceKind};
use medialog_db::models::genre::{CreateGenre, GenreResponse};
use medialog_db::repositories::GenreRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

use super::validate_slug_charset;

/// Request body for `POST /genres`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGenreRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50), custom(function = validate_slug_charset))]
    pub slug: String,
}

/// GET /api/v1/genres
///
/// List all genres ordered by name. Open to anonymous callers.
pub async fn list_genres(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<GenreResponse>>>> {
    let genres = GenreRepo::list(&state.pool).await?;
    let data = genres.into_iter().map(GenreResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/genres
///
/// Create a new genre. Admin only.
pub async fn create_genre(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGenreRequest>,
) -> AppResult<(StatusCode, Json<GenreResponse>)> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Genre, Operation::Create, caller.as_ref(), None)?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let create_dto = CreateGenre {
        name: input.name,
        slug: input.slug,
    };
    let genre = GenreRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Core(CoreError::Conflict(format!(
                    "Genre slug '{}' already exists",
                    create_dto.slug
                )))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(slug = %genre.slug, "Genre created");
    Ok((StatusCode::CREATED, Json(genre.into())))
}

/// DELETE /api/v1/genres/{slug}
///
/// Delete a genre by slug. Admin only. Returns 204 No Content.
pub async fn delete_genre(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Genre, Operation::Delete, caller.as_ref(), None)?;

    let deleted = GenreRepo::delete_by_slug(&state.pool, &slug).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Genre",
            key: slug,
        }));
    }

    tracing::info!(slug = %slug, "Genre deleted");
    Ok(StatusCode::NO_CONTENT)
}
