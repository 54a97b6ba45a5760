//! Handlers for course reviews (`/courses/{id}/reviews`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eduhub_core::error::CoreError;
use eduhub_core::review::{validate_comment, validate_rating};
use eduhub_core::types::DbId;
use eduhub_db::models::review::{CreateReview, Review};
use eduhub_db::repositories::{CourseRepo, EnrollmentRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireStudent;
use crate::response::ApiResponse;
use crate::state::AppState;

async fn ensure_course_exists(state: &AppState, id: DbId) -> AppResult<()> {
    CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(())
}

/// GET /api/courses/{id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    ensure_course_exists(&state, course_id).await?;
    let reviews = ReviewRepo::list_for_course(&state.pool, course_id).await?;
    Ok(Json(ApiResponse::list(reviews)))
}

/// POST /api/courses/{id}/reviews
///
/// Enrolled students only, one review each. The course rating is recomputed
/// in the same transaction.
pub async fn create_review(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(course_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    validate_rating(input.rating)?;
    validate_comment(input.comment.as_deref())?;
    ensure_course_exists(&state, course_id).await?;

    EnrollmentRepo::find(&state.pool, user.user_id, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotEnrolled { course_id }))?;

    let review = ReviewRepo::create(&state.pool, course_id, user.user_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "You have already reviewed this course".into(),
            ))
        })?;

    tracing::info!(course_id, user_id = user.user_id, rating = review.rating, "Review submitted");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}
