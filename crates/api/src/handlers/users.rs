//! Handlers for the `/users` resource (account administration).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::Json;
use eduhub_core::error::CoreError;
use eduhub_core::roles::validate_role;
use eduhub_core::types::DbId;
use eduhub_db::models::user::{AdminUpdateUser, UserResponse};
use eduhub_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::list(responses)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}
///
/// Change name, email, role or active flag. Deactivating an account also
/// revokes its sessions.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AdminUpdateUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        validate_role(role)?;
    }
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".into(),
        ));
    }

    let user = UserRepo::admin_update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    }

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User updated by admin");
    Ok(Json(ApiResponse::ok(user.into())))
}

/// DELETE /api/users/{id}
///
/// Soft-deactivate an account; course history stays intact.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".into(),
        ));
    }

    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    // Already-inactive accounts are a no-op.
    UserRepo::deactivate(&state.pool, id).await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deactivated");
    Ok(Json(ApiResponse::message("User deactivated")))
}
