//! Request authorization policy.
//!
//! All role and ownership comparisons live in this module. Handlers call
//! [`evaluate`] (or [`require_admin`] for the user-administration surface)
//! instead of testing roles inline, so the policy reads as one table rather
//! than a scatter of `role == "admin"` checks.
//!
//! Parent existence is checked by the handlers *before* permission is
//! evaluated: a missing title must surface as not-found even to a caller who
//! would have been denied the child operation.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Resources subject to the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Category,
    Genre,
    Title,
    Review,
    Comment,
}

/// The persistence operations gated by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// What a caller must present for a (resource, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, including anonymous callers.
    Open,
    /// Any authenticated user.
    Authenticated,
    /// The admin role.
    Admin,
    /// The resource's author, or a moderator/admin.
    AuthorOrModerator,
}

/// Identity of an authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
}

/// The policy table: resource x operation -> requirement.
pub fn required(resource: ResourceKind, op: Operation) -> Requirement {
    use Operation::*;
    use ResourceKind::*;

    match (resource, op) {
        // Catalog browsing needs no credential.
        (_, List | Retrieve) => Requirement::Open,
        // The catalog itself is curated by admins only.
        (Category | Genre | Title, _) => Requirement::Admin,
        // Anyone with an account may post content...
        (Review | Comment, Create) => Requirement::Authenticated,
        // ...but only its author or the moderation staff may change it.
        (Review | Comment, Update | Delete) => Requirement::AuthorOrModerator,
    }
}

/// Evaluate an operation against the policy table.
///
/// `author` is the stored author id of the target resource, for operations
/// whose requirement is ownership-scoped; pass `None` when the resource has
/// no ownership concept. Returns `Ok(())` to allow. Denials distinguish
/// "not authenticated" (`Unauthorized`) from "authenticated but insufficient"
/// (`Forbidden`).
pub fn evaluate(
    resource: ResourceKind,
    op: Operation,
    caller: Option<&Caller>,
    author: Option<DbId>,
) -> Result<(), CoreError> {
    match required(resource, op) {
        Requirement::Open => Ok(()),
        Requirement::Authenticated => {
            authenticated(caller)?;
            Ok(())
        }
        Requirement::Admin => {
            let caller = authenticated(caller)?;
            if caller.role == Role::Admin {
                Ok(())
            } else {
                Err(CoreError::Forbidden("Admin role required".into()))
            }
        }
        Requirement::AuthorOrModerator => {
            let caller = authenticated(caller)?;
            // Authorship is plain id equality; a moderator editing another
            // moderator's content passes via the role clause, not ownership.
            let is_author = author == Some(caller.user_id);
            if is_author || matches!(caller.role, Role::Moderator | Role::Admin) {
                Ok(())
            } else {
                Err(CoreError::Forbidden(
                    "Only the author or a moderator may modify this resource".into(),
                ))
            }
        }
    }
}

/// Gate for the user-administration surface (`/users`, `/users/{username}`),
/// which sits outside the resource table above.
pub fn require_admin(caller: &Caller) -> Result<(), CoreError> {
    if caller.role == Role::Admin {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Admin role required".into()))
    }
}

/// Whether the caller may set the `role` field on a user record.
/// Self-escalation must be structurally impossible: non-admin callers have
/// role changes ignored, whoever the target is.
pub fn may_assign_role(caller: &Caller) -> bool {
    caller.role == Role::Admin
}

fn authenticated(caller: Option<&Caller>) -> Result<&Caller, CoreError> {
    caller.ok_or_else(|| CoreError::Unauthorized("Authentication required".into()))
}
