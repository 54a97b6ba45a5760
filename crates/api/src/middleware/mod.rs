//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireInstructor`] -- Requires course-authoring rights (`instructor` or `admin`).
//! - [`rbac::RequireStudent`] -- Requires enrollment rights (`student`).
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
