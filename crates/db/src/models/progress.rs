//! Per-lesson progress rows and bookmarks.

use eduhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `lesson_progress`, unique per (user, lesson).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub lesson_id: DbId,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub watch_time_secs: i64,
    pub last_watched_at: Timestamp,
    pub quiz_score: Option<i16>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Watch-time and notes update for a lesson (`PUT /lessons/{id}/progress`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLessonProgress {
    pub watch_time_secs: Option<i64>,
    pub notes: Option<String>,
}

/// A row from `progress_bookmarks`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bookmark {
    pub id: DbId,
    pub progress_id: DbId,
    pub timestamp_secs: i32,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for adding a bookmark.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookmark {
    pub timestamp_secs: i32,
    pub note: Option<String>,
}

/// Result of marking a lesson complete.
#[derive(Debug, Clone, Serialize)]
pub struct LessonCompletion {
    pub progress: LessonProgress,
    /// Recomputed course-level percentage written back to the enrollment.
    pub course_progress: i16,
    pub course_completed: bool,
}
