//! Shared response envelope types for API handlers.
//!
//! List endpoints use a `{ "data": ... }` envelope; single resources are
//! returned bare. Use [`DataResponse`] instead of ad-hoc
//! `serde_json::json!({ "data": ... })` for compile-time type safety.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
