//! Handlers for the `/auth` resource (signup, activation, refresh).
//!
//! Accounts move through `Unregistered -> Pending -> Active`. Signup creates
//! the row inactive and dispatches a confirmation code derived from the
//! account's current state; `/auth/token` verifies the code, flips the flag
//! (compare-and-swap, at most one effective transition), and issues the
//! access/refresh credential pair. The flip itself invalidates the code, so
//! nothing is stored and nothing needs to expire.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use medialog_core::confirmation;
use medialog_core::error::CoreError;
use medialog_core::roles::Role;
use medialog_core::types::DbId;
use medialog_db::models::session::CreateSession;
use medialog_db::models::user::{CreateUser, User, UserResponse};
use medialog_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::handlers::users::{validate_username_charset, RESERVED_USERNAME};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 150), custom(function = validate_username_charset))]
    pub username: String,
    #[validate(email)]
    pub email: String,
}

/// Response body for `POST /auth/signup`: echoes the identity fields, never
/// the confirmation code.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by token issuance and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create a pending account and dispatch its confirmation code. Open to
/// anonymous callers.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    // "me" aliases the self-service route and can never name an account.
    if input.username == RESERVED_USERNAME {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Username '{RESERVED_USERNAME}' is reserved"
        ))));
    }

    // Pre-checks give a precise message; the unique indexes still catch a
    // raced duplicate below.
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
        || UserRepo::find_by_email(&state.pool, &input.email)
            .await?
            .is_some()
    {
        return Err(cannot_create_user());
    }

    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        role: Role::User.as_str().to_string(),
    };

    let user = UserRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                cannot_create_user()
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up (pending)");

    dispatch_confirmation_code(&state, &user);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: user.username,
            email: user.email,
        }),
    ))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for access + refresh credentials, activating
/// the account on first use. A code presented after the active flag has
/// changed fails closed: re-confirming an already-active account is an
/// error, not a way to mint fresh credentials.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    let mut user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidCredential("Unknown username".into()))
        })?;

    let code_valid = confirmation::verify(
        &state.config.confirmation_secret,
        &user.username,
        user.is_active,
        &input.confirmation_code,
    );
    if !code_valid {
        return Err(AppError::Core(CoreError::InvalidCredential(
            "Invalid confirmation code".into(),
        )));
    }

    // Compare-and-swap on the active flag. Losing the race to a concurrent
    // confirmation (or somehow holding a code for the active state) means
    // the state this code was derived from is gone: fail closed.
    let flipped = UserRepo::activate(&state.pool, user.id).await?;
    if !flipped {
        return Err(AppError::Core(CoreError::InvalidCredential(
            "Confirmation code is no longer valid".into(),
        )));
    }
    user.is_active = true;

    tracing::info!(user_id = user.id, username = %user.username, "User activated");
    state.activation_hooks.run(&user);

    let role: Role = user
        .role
        .parse()
        .map_err(|e: CoreError| AppError::InternalError(e.to_string()))?;

    let response = create_auth_response(&state, user.id, role, user.into()).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Token rotation: the presented refresh token is spent either way.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is not active".into(),
        )));
    }

    let role: Role = user
        .role
        .parse()
        .map_err(|e: CoreError| AppError::InternalError(e.to_string()))?;

    let response = create_auth_response(&state, user.id, role, user.into()).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The domain-level duplicate-identity error; storage detail never leaks.
fn cannot_create_user() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Cannot create user: username or email already taken".into(),
    ))
}

/// Derive the confirmation code from the user's current state and hand it to
/// the delivery channel. Fire-and-forget: delivery failure is logged, never
/// surfaced to the signup response.
fn dispatch_confirmation_code(state: &AppState, user: &User) {
    let code = confirmation::derive(
        &state.config.confirmation_secret,
        &user.username,
        user.is_active,
    );
    let mailer = Arc::clone(&state.mailer);
    let destination = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.deliver(&destination, &code).await {
            tracing::warn!(error = %e, destination, "Confirmation code delivery failed");
        }
    });
}

/// Generate access + refresh tokens, persist a session row, and build the
/// response.
async fn create_auth_response(
    state: &AppState,
    user_id: DbId,
    role: Role,
    user: UserResponse,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user_id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session_input = CreateSession {
        user_id,
        refresh_token_hash: refresh_hash,
        expires_at,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user,
    })
}
