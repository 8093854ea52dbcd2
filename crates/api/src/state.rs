use std::sync::Arc;

use crate::auth::activation::ActivationHooks;
use crate::config::ServerConfig;
use crate::mail::CodeDelivery;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: medialog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Confirmation-code delivery channel (SMTP, or log-only in dev).
    pub mailer: Arc<dyn CodeDelivery>,
    /// Hooks run synchronously after a user flips from pending to active.
    pub activation_hooks: Arc<ActivationHooks>,
}
