//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role lacks the
//! route's requirement with 403. Ownership of a specific course is checked
//! separately in the handlers, after the course has been loaded.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eduhub_core::roles::{authorize_capability, authorize_role, Capability, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize_role(&user.role, &[ROLE_ADMIN])?;
        Ok(RequireAdmin(user))
    }
}

/// Requires the `write` capability: `instructor` or `admin`.
pub struct RequireInstructor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize_capability(&user.role, Capability::Write)?;
        Ok(RequireInstructor(user))
    }
}

/// Requires the `enroll` capability, which only students carry.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize_capability(&user.role, Capability::Enroll)?;
        Ok(RequireStudent(user))
    }
}

/// Requires any authenticated user with the `read` capability.
///
/// Equivalent to [`AuthUser`] for every known role, but rejects tokens that
/// carry an unknown role.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize_capability(&user.role, Capability::Read)?;
        Ok(RequireAuth(user))
    }
}
