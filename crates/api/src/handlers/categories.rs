//! Handlers for the `/categories` resource.
//!
//! Reads are open; writes go through the permission evaluator (admin only).
//! The slug is the stable external key: creation takes it in the body,
//! deletion addresses by it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions::{evaluate, Operation, ResourceKind};
use medialog_db::models::category::{CategoryResponse, CreateCategory};
use medialog_db::repositories::CategoryRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

use super::validate_slug_charset;

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50), custom(function = validate_slug_charset))]
    pub slug: String,
}

/// GET /api/v1/categories
///
/// List all categories ordered by name. Open to anonymous callers.
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryResponse>>>> {
    let categories = CategoryRepo::list(&state.pool).await?;
    let data = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/categories
///
/// Create a new category. Admin only.
pub async fn create_category(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Category, Operation::Create, caller.as_ref(), None)?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let create_dto = CreateCategory {
        name: input.name,
        slug: input.slug,
    };
    let category = CategoryRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Core(CoreError::Conflict(format!(
                    "Category slug '{}' already exists",
                    create_dto.slug
                )))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// DELETE /api/v1/categories/{slug}
///
/// Delete a category by slug. Admin only. Titles referencing the category
/// keep existing with a nulled reference. Returns 204 No Content.
pub async fn delete_category(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Category, Operation::Delete, caller.as_ref(), None)?;

    let deleted = CategoryRepo::delete_by_slug(&state.pool, &slug).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Category",
            key: slug,
        }));
    }

    tracing::info!(slug = %slug, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
