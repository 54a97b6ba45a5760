//! Role names, capabilities, and the pure authorization checks built on them.
//!
//! Two independent gates exist:
//!
//! - the *role* gate, applied per route, which only looks at the actor's role;
//! - the *ownership* gate, applied per resource, which binds course and lesson
//!   mutation to the instructor who owns the course (admins bypass it).
//!
//! Both are plain functions of their inputs so handlers can call them after
//! the resource fetch they already performed.

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_ADMIN: &str = "admin";

/// All valid role names, in ascending order of privilege.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_INSTRUCTOR, ROLE_ADMIN];

/// Roles a visitor may pick for themselves at registration.
pub const SELF_REGISTRABLE_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_INSTRUCTOR];

/// What an actor is allowed to do, independent of any particular resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Browse catalog entries, lessons and their own data.
    Read,
    /// Author courses and lessons (subject to the ownership check).
    Write,
    /// Enroll in courses and record learning progress.
    Enroll,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Enroll => "enroll",
        }
    }
}

/// Capabilities granted to a role. Unknown roles get nothing.
pub fn capabilities(role: &str) -> &'static [Capability] {
    match role {
        ROLE_STUDENT => &[Capability::Read, Capability::Enroll],
        ROLE_INSTRUCTOR | ROLE_ADMIN => &[Capability::Read, Capability::Write],
        _ => &[],
    }
}

/// Whether `role` carries `capability`.
pub fn has_capability(role: &str, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Whether a visitor may register with `role` without an admin's help.
pub fn is_self_registrable(role: &str) -> bool {
    SELF_REGISTRABLE_ROLES.contains(&role)
}

/// Route-level role gate: the actor's role must be in `allowed`.
pub fn authorize_role(role: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' is not authorized to access this route"
        )))
    }
}

/// Route-level capability gate.
pub fn authorize_capability(role: &str, capability: Capability) -> Result<(), CoreError> {
    if has_capability(role, capability) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' lacks the '{}' capability",
            capability.as_str()
        )))
    }
}

/// Resource-level ownership gate for course and lesson mutation.
///
/// Passes when the actor owns the resource or is an admin. `action` names the
/// attempted operation in the error message (e.g. "update", "delete").
pub fn ensure_owner(
    actor_id: DbId,
    actor_role: &str,
    owner_id: DbId,
    action: &str,
) -> Result<(), CoreError> {
    if actor_id == owner_id || actor_role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not authorized to {action} this course"
        )))
    }
}
