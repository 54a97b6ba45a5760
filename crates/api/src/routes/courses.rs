//! Route definitions for the `/courses` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{courses, reviews};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// The literal `my-courses` and `instructor/*` paths take precedence over
/// `/{id}`.
///
/// ```text
/// GET    /                         -> list_courses (public)
/// POST   /                         -> create_course
/// GET    /my-courses               -> my_courses
/// GET    /instructor/my-courses    -> instructor_courses
/// GET    /instructor/stats         -> instructor_stats
/// GET    /{id}                     -> get_course (public)
/// PUT    /{id}                     -> update_course
/// DELETE /{id}                     -> delete_course
/// PUT    /{id}/publish             -> toggle_publish
/// POST   /{id}/enroll              -> enroll
/// POST   /{id}/unenroll            -> unenroll
/// PUT    /{id}/progress            -> update_progress
/// GET    /{id}/analytics           -> course_analytics
/// GET    /{id}/reviews             -> list_reviews (public)
/// POST   /{id}/reviews             -> create_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses).post(courses::create_course))
        .route("/my-courses", get(courses::my_courses))
        .route("/instructor/my-courses", get(courses::instructor_courses))
        .route("/instructor/stats", get(courses::instructor_stats))
        .route(
            "/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/{id}/publish", put(courses::toggle_publish))
        .route("/{id}/enroll", post(courses::enroll))
        .route("/{id}/unenroll", post(courses::unenroll))
        .route("/{id}/progress", put(courses::update_progress))
        .route("/{id}/analytics", get(courses::course_analytics))
        .route(
            "/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
}
