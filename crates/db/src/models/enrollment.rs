//! Enrollment, completion, and enrollment-derived read models.

use eduhub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::course::Course;

/// A row from the `enrollments` table: a user's entry for one course.
///
/// `progress` is a cache of the lesson-derived percentage.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub enrolled_at: Timestamp,
    pub progress: i16,
}

/// A course as seen from the enrolled student's dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub instructor_name: String,
    pub enrolled_at: Timestamp,
    pub progress: i16,
    pub is_completed: bool,
}

/// An enrolled student as seen from a course's analytics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledStudent {
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub enrolled_at: Timestamp,
    pub progress: i16,
    pub is_completed: bool,
}

/// A recent enrollment across all of an instructor's courses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentEnrollment {
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub course_id: DbId,
    pub course_title: String,
    pub enrolled_at: Timestamp,
    pub progress: i16,
}

/// A row from `course_completions`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseCompletion {
    pub user_id: DbId,
    pub course_id: DbId,
    pub completed_at: Timestamp,
}

/// What an unenrollment removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unenrollment {
    pub progress_rows_deleted: u64,
    pub completion_removed: bool,
}

/// Result of writing a progress value onto an enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub enrollment: Enrollment,
    /// Whether the course is now in the user's completed list.
    pub course_completed: bool,
}
