pub mod auth;
pub mod courses;
pub mod health;
pub mod lessons;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user
/// /auth/profile                                    update profile (PUT)
///
/// /users                                           list (admin only)
/// /users/{id}                                      get, update, deactivate
///
/// /courses                                         catalog (public), create
/// /courses/my-courses                              enrolled courses (student)
/// /courses/instructor/my-courses                   owned courses with stats
/// /courses/instructor/stats                        instructor dashboard
/// /courses/{id}                                    detail (public), update, delete
/// /courses/{id}/publish                            toggle publication (PUT)
/// /courses/{id}/enroll                             enroll (POST, student)
/// /courses/{id}/unenroll                           unenroll (POST, student)
/// /courses/{id}/progress                           direct progress set (PUT)
/// /courses/{id}/analytics                          per-course analytics
/// /courses/{id}/reviews                            list (public), create
///
/// /lessons                                         create
/// /lessons/course/{course_id}                      lessons of a course
/// /lessons/course/{course_id}/progress             caller's progress rows
/// /lessons/{id}                                    get, update, delete
/// /lessons/{id}/complete                           mark completed (POST)
/// /lessons/{id}/progress                           watch time and notes (PUT)
/// /lessons/{id}/quiz                               submit answers (POST)
/// /lessons/{id}/bookmarks                          list, add
/// /lessons/{id}/bookmarks/{bookmark_id}            remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/courses", courses::router())
        .nest("/lessons", lessons::router())
}
