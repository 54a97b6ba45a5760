//! Route definitions for the `/lessons` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::lessons;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// POST   /                               -> create_lesson
/// GET    /course/{course_id}             -> list_course_lessons
/// GET    /course/{course_id}/progress    -> course_progress
/// GET    /{id}                           -> get_lesson
/// PUT    /{id}                           -> update_lesson
/// DELETE /{id}                           -> delete_lesson
/// POST   /{id}/complete                  -> complete_lesson
/// PUT    /{id}/progress                  -> update_lesson_progress
/// POST   /{id}/quiz                      -> submit_quiz
/// GET    /{id}/bookmarks                 -> list_bookmarks
/// POST   /{id}/bookmarks                 -> add_bookmark
/// DELETE /{id}/bookmarks/{bookmark_id}   -> delete_bookmark
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(lessons::create_lesson))
        .route("/course/{course_id}", get(lessons::list_course_lessons))
        .route("/course/{course_id}/progress", get(lessons::course_progress))
        .route(
            "/{id}",
            get(lessons::get_lesson)
                .put(lessons::update_lesson)
                .delete(lessons::delete_lesson),
        )
        .route("/{id}/complete", post(lessons::complete_lesson))
        .route("/{id}/progress", put(lessons::update_lesson_progress))
        .route("/{id}/quiz", post(lessons::submit_quiz))
        .route(
            "/{id}/bookmarks",
            get(lessons::list_bookmarks).post(lessons::add_bookmark),
        )
        .route(
            "/{id}/bookmarks/{bookmark_id}",
            delete(lessons::delete_bookmark),
        )
}
