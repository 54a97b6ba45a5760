//! Lesson entity model and DTOs.

use eduhub_core::lesson::{LessonResource, QuizQuestion};
use eduhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A lesson row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub course_id: DbId,
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub duration_mins: i32,
    pub video_url: String,
    pub resources: Json<Vec<LessonResource>>,
    pub quiz: Json<Vec<QuizQuestion>>,
    pub is_preview: bool,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lesson under a course.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLesson {
    pub course_id: DbId,
    #[validate(length(min = 1, max = 100, message = "Lesson title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description cannot be more than 1000 characters"))]
    pub description: Option<String>,
    pub sort_order: i32,
    pub duration_mins: i32,
    #[validate(length(min = 1, message = "Please provide video URL"))]
    pub video_url: String,
    #[serde(default)]
    pub resources: Vec<LessonResource>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    pub is_preview: Option<bool>,
    pub is_published: Option<bool>,
}

/// DTO for updating a lesson. All fields are optional; the course is fixed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLesson {
    #[validate(length(min = 1, max = 100, message = "Lesson title must be 1-100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot be more than 1000 characters"))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub duration_mins: Option<i32>,
    #[validate(length(min = 1, message = "Please provide video URL"))]
    pub video_url: Option<String>,
    pub resources: Option<Vec<LessonResource>>,
    pub quiz: Option<Vec<QuizQuestion>>,
    pub is_preview: Option<bool>,
    pub is_published: Option<bool>,
}
