//! HTTP-level integration tests for the catalog endpoints
//! (categories, genres, titles).

mod common;

use axum::http::StatusCode;
use common::{
    access_token_for, body_json, delete, delete_auth, get, patch_json_auth, post_json,
    post_json_auth,
};
use medialog_core::roles::Role;
use medialog_db::models::user::CreateUser;
use medialog_db::repositories::UserRepo;
use sqlx::PgPool;

/// Create an active user directly in the database and mint a matching token.
async fn user_with_token(pool: &PgPool, username: &str, role: Role) -> String {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            role: role.as_str().to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    UserRepo::activate(pool, user.id).await.expect("activation should succeed");
    access_token_for(user.id, role)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// End-to-end: admin creates a category, anonymous listing sees it, and a
/// non-admin's create attempt is forbidden.
#[sqlx::test(migrations = "../../db/migrations")]
async fn category_create_list_permissions(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    let plain = user_with_token(&pool, "plain", Role::User).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Film", "slug": "film" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["slug"], "film");

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/categories").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let slugs: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert!(slugs.contains(&"film"));

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Books", "slug": "books" }),
        &plain,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_category_create_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Film", "slug": "film" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn categories_list_in_name_order(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    for (name, slug) in [("Series", "series"), ("Books", "books"), ("Film", "film")] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            "/api/v1/categories",
            serde_json::json!({ "name": name, "slug": slug }),
            &admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let json = body_json(get(app, "/api/v1/categories").await).await;
        let names: Vec<_> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Books", "Film", "Series"]);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_category_slug_conflicts(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "name": "Film", "slug": "film" });
    let response = post_json_auth(app, "/api/v1/categories", body.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/categories", body, &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_slug_charset_is_validated(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Film", "slug": "Fil m!" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn category_delete_by_slug(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    let plain = user_with_token(&pool, "plain", Role::User).await;

    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Film", "slug": "film" }),
        &admin,
    )
    .await;

    // Non-admin and anonymous deletes are denied, not 404.
    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/categories/film", &plain).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/api/v1/categories/film").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/categories/film", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/categories/film", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn genre_write_requires_admin(pool: PgPool) {
    let moderator = user_with_token(&pool, "mod", Role::Moderator).await;

    // Moderators moderate content, not the catalog.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/genres",
        serde_json::json!({ "name": "Noir", "slug": "noir" }),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/genres").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Seed a category, two genres, and one title referencing them.
async fn seed_title(pool: &PgPool, admin: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/categories",
        serde_json::json!({ "name": "Film", "slug": "film" }),
        admin,
    )
    .await;
    for (name, slug) in [("Noir", "noir"), ("Sci-Fi", "sci-fi")] {
        let app = common::build_test_app(pool.clone());
        post_json_auth(
            app,
            "/api/v1/genres",
            serde_json::json!({ "name": name, "slug": slug }),
            admin,
        )
        .await;
    }

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/titles",
        serde_json::json!({
            "name": "Stalker",
            "year": 1979,
            "description": "Zone expedition",
            "category": "film",
            "genre": ["noir", "sci-fi"],
        }),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_read_nests_category_and_genres(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    let id = seed_title(&pool, &admin).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/titles/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["name"], "Stalker");
    assert_eq!(json["year"], 1979);
    assert_eq!(json["category"]["slug"], "film");
    let genre_slugs: Vec<_> = json["genre"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["slug"].as_str().unwrap())
        .collect();
    assert_eq!(genre_slugs, vec!["noir", "sci-fi"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_with_unknown_genre_slug_is_invalid(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/titles",
        serde_json::json!({ "name": "Brazil", "year": 1985, "genre": ["missing"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_patch_updates_fields(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    let id = seed_title(&pool, &admin).await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/titles/{id}"),
        serde_json::json!({ "year": 1980, "genre": ["noir"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["year"], 1980);
    assert_eq!(json["name"], "Stalker", "absent fields stay unchanged");
    assert_eq!(json["genre"].as_array().unwrap().len(), 1);
}

/// Deleting a category must not delete its titles; the reference nulls out.
#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_category_keeps_titles(pool: PgPool) {
    let admin = user_with_token(&pool, "admin", Role::Admin).await;
    let id = seed_title(&pool, &admin).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/categories/film", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/titles/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["category"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_title_is_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/titles/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
