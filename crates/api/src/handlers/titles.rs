//! Handlers for the `/titles` resource.
//!
//! Reads nest the category object and genre list; writes accept category and
//! genre references by slug and are admin-only.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medialog_core::error::CoreError;
use medialog_core::permissions::{evaluate, Operation, ResourceKind};
use medialog_core::types::DbId;
use medialog_db::models::category::CategoryResponse;
use medialog_db::models::genre::GenreResponse;
use medialog_db::models::title::{CreateTitle, Title, TitleResponse, UpdateTitle};
use medialog_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0, max = 32767))]
    pub year: i32,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Request body for `PATCH /titles/{id}`. Absent fields are left unchanged;
/// clearing the category reference happens only through category deletion.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 32767))]
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs; when present, replaces the full genre list.
    pub genre: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles
///
/// List all titles with nested category and genres. Open to anonymous callers.
pub async fn list_titles(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TitleResponse>>>> {
    let titles = TitleRepo::list(&state.pool).await?;

    // Pre-fetch categories and genre links to avoid a query per title.
    let categories: HashMap<DbId, CategoryResponse> = CategoryRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.id, CategoryResponse::from(c)))
        .collect();

    let mut genres_by_title: HashMap<DbId, Vec<GenreResponse>> = HashMap::new();
    for row in TitleRepo::list_genre_rows(&state.pool).await? {
        genres_by_title
            .entry(row.title_id)
            .or_default()
            .push(GenreResponse {
                name: row.name,
                slug: row.slug,
            });
    }

    let data = titles
        .into_iter()
        .map(|title| {
            let category = title.category_id.and_then(|id| categories.get(&id).cloned());
            let genre = genres_by_title.remove(&title.id).unwrap_or_default();
            build_response(title, category, genre)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TitleResponse>> {
    let title = find_title(&state, id).await?;
    let response = assemble_response(&state, title).await?;
    Ok(Json(response))
}

/// POST /api/v1/titles
///
/// Create a new title. Admin only. Category and genres are referenced by
/// slug; an unknown slug is a validation error.
pub async fn create_title(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTitleRequest>,
) -> AppResult<(StatusCode, Json<TitleResponse>)> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Title, Operation::Create, caller.as_ref(), None)?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let category_id = resolve_category(&state, input.category.as_deref()).await?;
    let genre_ids = resolve_genres(&state, &input.genre).await?;

    let create_dto = CreateTitle {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
    };
    let title = TitleRepo::create(&state.pool, &create_dto).await?;
    TitleRepo::set_genres(&state.pool, title.id, &genre_ids).await?;

    tracing::info!(title_id = title.id, "Title created");

    let response = assemble_response(&state, title).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /api/v1/titles/{id}
///
/// Update a title. Admin only.
pub async fn update_title(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTitleRequest>,
) -> AppResult<Json<TitleResponse>> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Title, Operation::Update, caller.as_ref(), None)?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    find_title(&state, id).await?;

    let category_id = resolve_category(&state, input.category.as_deref()).await?;

    let update_dto = UpdateTitle {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
    };
    let title = TitleRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }))?;

    if let Some(genre_slugs) = &input.genre {
        let genre_ids = resolve_genres(&state, genre_slugs).await?;
        TitleRepo::set_genres(&state.pool, title.id, &genre_ids).await?;
    }

    let response = assemble_response(&state, title).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/titles/{id}
///
/// Delete a title. Admin only. Returns 204 No Content.
pub async fn delete_title(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let caller = user.as_ref().map(|u| u.caller());
    evaluate(ResourceKind::Title, Operation::Delete, caller.as_ref(), None)?;

    let deleted = TitleRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }));
    }

    tracing::info!(title_id = id, "Title deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_title(state: &AppState, id: DbId) -> AppResult<Title> {
    TitleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }))
}

/// Resolve an optional category slug to its id. Unknown slugs are validation
/// errors: the reference is part of the request payload, not the path.
async fn resolve_category(
    state: &AppState,
    slug: Option<&str>,
) -> AppResult<Option<DbId>> {
    match slug {
        None => Ok(None),
        Some(slug) => {
            let category = CategoryRepo::find_by_slug(&state.pool, slug)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Category with slug '{slug}' does not exist"
                    )))
                })?;
            Ok(Some(category.id))
        }
    }
}

/// Resolve genre slugs to ids, rejecting the whole request on the first
/// unknown slug.
async fn resolve_genres(state: &AppState, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let genre = GenreRepo::find_by_slug(&state.pool, slug)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Genre with slug '{slug}' does not exist"
                )))
            })?;
        ids.push(genre.id);
    }
    Ok(ids)
}

/// Load the nested category and genre list for a single title.
async fn assemble_response(state: &AppState, title: Title) -> AppResult<TitleResponse> {
    let category = match title.category_id {
        Some(id) => CategoryRepo::find_by_id(&state.pool, id)
            .await?
            .map(CategoryResponse::from),
        None => None,
    };

    let genre = TitleRepo::genre_rows_for(&state.pool, title.id)
        .await?
        .into_iter()
        .map(|row| GenreResponse {
            name: row.name,
            slug: row.slug,
        })
        .collect();

    Ok(build_response(title, category, genre))
}

fn build_response(
    title: Title,
    category: Option<CategoryResponse>,
    genre: Vec<GenreResponse>,
) -> TitleResponse {
    TitleResponse {
        id: title.id,
        name: title.name,
        year: title.year,
        description: title.description,
        category,
        genre,
    }
}
