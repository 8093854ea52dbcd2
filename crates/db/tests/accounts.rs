//! Integration tests for the user and session repositories.
//!
//! Exercises account lifecycle invariants against a real database:
//! uniqueness enforcement, the activation compare-and-swap, and
//! refresh-session lookup semantics.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use medialog_db::models::session::CreateSession;
use medialog_db::models::user::{CreateUser, UpdateUser};
use medialog_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        role: "user".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fresh_user_is_inactive(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();
    assert!(!user.is_active, "signup must create a pending account");
    assert_eq!(user.role, "user");
    assert_eq!(user.bio, "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_rejected(pool: PgPool) {
    UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    let mut dup = new_user("alice");
    dup.email = "other@test.com".to_string();
    let err = UserRepo::create(&pool, &dup).await.unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_users_username"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_rejected(pool: PgPool) {
    UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    let mut dup = new_user("bob");
    dup.email = "alice@test.com".to_string();
    let err = UserRepo::create(&pool, &dup).await.unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_flips_at_most_once(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    // First confirmation performs the transition...
    assert!(UserRepo::activate(&pool, user.id).await.unwrap());
    // ...any later one observes the guard and reports no effect.
    assert!(!UserRepo::activate(&pool, user.id).await.unwrap());

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(reloaded.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activate_unknown_user_reports_no_effect(pool: PgPool) {
    assert!(!UserRepo::activate(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_applies_only_present_fields(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    let update = UpdateUser {
        bio: Some("hello".to_string()),
        ..Default::default()
    };
    let updated = UserRepo::update(&pool, user.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.bio, "hello");
    assert_eq!(updated.username, "alice", "absent fields stay unchanged");
    assert_eq!(updated.email, "alice@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_outside_the_closed_set_is_rejected_by_schema(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    let update = UpdateUser {
        role: Some("superuser".to_string()),
        ..Default::default()
    };
    let err = UserRepo::update(&pool, user.id, &update).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_orders_by_username(pool: PgPool) {
    for name in ["charlie", "alice", "bob"] {
        UserRepo::create(&pool, &new_user(name)).await.unwrap();
    }

    let users = UserRepo::list(&pool).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "charlie"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_user_cascades_sessions(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();
    let session = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "hash".to_string(),
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
    .unwrap();

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());

    let found = SessionRepo::find_by_refresh_token_hash(&pool, &session.refresh_token_hash)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoked_and_expired_sessions_are_invisible(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice")).await.unwrap();

    let expired = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "expired".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        },
    )
    .await
    .unwrap();
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, &expired.refresh_token_hash)
        .await
        .unwrap()
        .is_none());

    let active = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "active".to_string(),
            expires_at: Utc::now() + Duration::days(1),
        },
    )
    .await
    .unwrap();
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "active")
        .await
        .unwrap()
        .is_some());

    assert!(SessionRepo::revoke(&pool, active.id).await.unwrap());
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "active")
        .await
        .unwrap()
        .is_none());
    // Revoking twice reports no effect.
    assert!(!SessionRepo::revoke(&pool, active.id).await.unwrap());
}
