//! HTTP-level integration tests for reviews and comments: score bounds,
//! author stamping, ownership/moderation permissions, and parent-path
//! scoping.

mod common;

use axum::http::StatusCode;
use common::{
    access_token_for, body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth,
};
use medialog_core::roles::Role;
use medialog_db::models::title::CreateTitle;
use medialog_db::models::user::CreateUser;
use medialog_db::repositories::{TitleRepo, UserRepo};
use sqlx::PgPool;

/// Create an active user directly in the database; returns (id, token).
async fn user_with_token(pool: &PgPool, username: &str, role: Role) -> (i64, String) {
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
    (user.id, access_token_for(user.id, role))
}

async fn seed_title(pool: &PgPool, name: &str) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 1979,
            description: None,
            category_id: None,
        },
    )
    .await
    .expect("title creation should succeed")
    .id
}

/// Post a review and return its id.
async fn post_review(pool: &PgPool, title_id: i64, token: &str, score: i32) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        serde_json::json!({ "text": "a review", "score": score }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Out-of-range scores are rejected; a valid one lands with stamped
/// author and title.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_score_bounds_and_stamping(pool: PgPool) {
    let (user_id, token) = user_with_token(&pool, "alice", Role::User).await;
    let title_id = seed_title(&pool, "Stalker").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        serde_json::json!({ "text": "too good", "score": 11 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        serde_json::json!({ "text": "solid", "score": 7 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["score"], 7);
    assert_eq!(json["author_id"], user_id, "author comes from the caller");
    assert_eq!(json["title_id"], title_id, "title comes from the path");
}

/// Both score bounds are inclusive.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_score_boundaries_accepted(pool: PgPool) {
    let (_, token) = user_with_token(&pool, "alice", Role::User).await;
    let title_id = seed_title(&pool, "Stalker").await;

    for score in [1, 10] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            &format!("/api/v1/titles/{title_id}/reviews"),
            serde_json::json!({ "text": "boundary", "score": score }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "score {score} must pass");
    }
}

/// The author payload field is ignored: stamping is server-side only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_author_cannot_be_set_from_payload(pool: PgPool) {
    let (user_id, token) = user_with_token(&pool, "alice", Role::User).await;
    let title_id = seed_title(&pool, "Stalker").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        serde_json::json!({ "text": "mine", "score": 5, "author_id": 424242 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["author_id"], user_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_review_write_is_unauthorized(pool: PgPool) {
    let title_id = seed_title(&pool, "Stalker").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        serde_json::json!({ "text": "anon", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reading stays open.
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/titles/{title_id}/reviews")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// A missing parent title is 404 before any permission question, even for
/// an anonymous writer.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_on_missing_title_is_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/titles/999999/reviews",
        serde_json::json!({ "text": "void", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Ownership and moderation: another plain user is forbidden, the author
/// and a moderator both succeed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_update_permissions(pool: PgPool) {
    let (_u, author_token) = user_with_token(&pool, "author", Role::User).await;
    let (_v, other_token) = user_with_token(&pool, "other", Role::User).await;
    let (_m, moderator_token) = user_with_token(&pool, "mod", Role::Moderator).await;
    let title_id = seed_title(&pool, "Stalker").await;
    let review_id = post_review(&pool, title_id, &author_token, 6).await;

    let uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}");

    let app = common::build_test_app(pool.clone());
    let response =
        patch_json_auth(app, &uri, serde_json::json!({ "score": 2 }), &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response =
        patch_json_auth(app, &uri, serde_json::json!({ "score": 8 }), &moderator_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["score"], 8);

    let app = common::build_test_app(pool.clone());
    let response =
        patch_json_auth(app, &uri, serde_json::json!({ "text": "edited" }), &author_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_update_rejects_out_of_range_score(pool: PgPool) {
    let (_u, token) = user_with_token(&pool, "author", Role::User).await;
    let title_id = seed_title(&pool, "Stalker").await;
    let review_id = post_review(&pool, title_id, &token, 6).await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}"),
        serde_json::json!({ "score": 0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A review reached through the wrong title path is 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn review_is_scoped_to_its_title_path(pool: PgPool) {
    let (_u, token) = user_with_token(&pool, "author", Role::User).await;
    let t1 = seed_title(&pool, "Stalker").await;
    let t2 = seed_title(&pool, "Solaris").await;
    let review_id = post_review(&pool, t1, &token, 6).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/titles/{t2}/reviews/{review_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

async fn post_comment(pool: &PgPool, title_id: i64, review_id: i64, token: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments"),
        serde_json::json!({ "text": "a comment" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// A comment lands under its review with the caller stamped as author.
#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_create_and_list(pool: PgPool) {
    let (user_id, token) = user_with_token(&pool, "alice", Role::User).await;
    let title_id = seed_title(&pool, "Stalker").await;
    let review_id = post_review(&pool, title_id, &token, 6).await;
    post_comment(&pool, title_id, review_id, &token).await;

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let comments = json["data"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["author_id"], user_id);
    assert_eq!(comments[0]["review_id"], review_id);
}

/// A review addressed under a title it does not belong to yields 404 for
/// the whole comment subtree.
#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_parent_mismatch_is_404(pool: PgPool) {
    let (_u, token) = user_with_token(&pool, "alice", Role::User).await;
    let t1 = seed_title(&pool, "Stalker").await;
    let t2 = seed_title(&pool, "Solaris").await;
    let review_id = post_review(&pool, t1, &token, 6).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{t2}/reviews/{review_id}/comments"),
        serde_json::json!({ "text": "misfiled" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_moderation_permissions(pool: PgPool) {
    let (_a, author_token) = user_with_token(&pool, "author", Role::User).await;
    let (_o, other_token) = user_with_token(&pool, "other", Role::User).await;
    let (_m, admin_token) = user_with_token(&pool, "boss", Role::Admin).await;
    let title_id = seed_title(&pool, "Stalker").await;
    let review_id = post_review(&pool, title_id, &author_token, 6).await;
    let comment_id = post_comment(&pool, title_id, review_id, &author_token).await;

    let uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}");

    let app = common::build_test_app(pool.clone());
    let response =
        patch_json_auth(app, &uri, serde_json::json!({ "text": "hijack" }), &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
