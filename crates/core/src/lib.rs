//! Domain logic shared across the medialog crates.
//!
//! Everything in here is pure and I/O-free: the role model, the permission
//! policy table, confirmation-code derivation, and the domain error type.
//! Persistence lives in `medialog-db`, HTTP in `medialog-api`.

pub mod confirmation;
pub mod error;
pub mod permissions;
pub mod roles;
pub mod types;
