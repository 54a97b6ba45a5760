//! Course entity model and DTOs.

use eduhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A course row from the `courses` table.
///
/// `is_published` and `total_lessons` are computed by the query, not stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub instructor_id: DbId,
    pub category: String,
    pub level: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub duration_hours: i32,
    pub duration_minutes: i32,
    pub language: String,
    pub requirements: Vec<String>,
    pub learning_outcomes: Vec<String>,
    pub tags: Vec<String>,
    pub students_enrolled: i32,
    pub rating_average: f64,
    pub rating_count: i32,
    pub status: String,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub views: i64,
    pub total_lessons: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A course joined with its instructor's public profile, for catalog lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseWithInstructor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub instructor_name: String,
    pub instructor_avatar_url: Option<String>,
}

/// DTO for creating a new course. Status always starts as `draft`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 1, max = 100, message = "Course title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
    #[validate(length(max = 200, message = "Short description cannot be more than 200 characters"))]
    pub short_description: Option<String>,
    pub category: String,
    pub level: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<i32>,
    #[validate(range(min = 0, max = 59, message = "Minutes must be 0-59"))]
    pub duration_minutes: Option<i32>,
    pub language: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating an existing course. All fields are optional.
///
/// `status` moves through the generic lifecycle (e.g. to `pending` or
/// `archived`); publication toggling has its own endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourse {
    #[validate(length(min = 1, max = 100, message = "Course title must be 1-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Short description cannot be more than 200 characters"))]
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub discount_price: Option<f64>,
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<i32>,
    #[validate(range(min = 0, max = 59, message = "Minutes must be 0-59"))]
    pub duration_minutes: Option<i32>,
    pub language: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub learning_outcomes: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Filters applied to the public catalog. `None` means "no filter".
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<String>,
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
}

/// Per-course enrollment counts for the instructor dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentCounts {
    pub course_id: DbId,
    pub enrolled: i64,
    pub completed: i64,
}

/// Rows removed while deleting a course and everything hanging off it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseDeletion {
    pub progress_rows_deleted: u64,
    pub enrollments_removed: u64,
    pub completions_removed: u64,
    pub lessons_deleted: u64,
    pub reviews_deleted: u64,
}
