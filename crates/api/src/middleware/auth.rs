//! Bearer-token authentication.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use eduhub_core::error::CoreError;
use eduhub_core::types::DbId;
use eduhub_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, as asserted by a valid access token and confirmed against
/// the stored account.
///
/// The role comes from the database rather than the token, so a demotion or
/// deactivation takes effect on the next request. Role checks live in the
/// `Require*` extractors of [`super::rbac`]; take `AuthUser` directly for
/// endpoints any signed-in user may call.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// `student`, `instructor` or `admin`.
    pub role: String,
}

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Not authorized to access this route".into()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            CoreError::Unauthorized("Invalid or expired token".into())
        })?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                tracing::debug!(user_id = claims.sub, "Token for missing or deactivated account");
                CoreError::Unauthorized("Account is no longer active".into())
            })?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
        })
    }
}
