//! Repository for the `lessons` table.

use eduhub_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use crate::repositories::EnrollmentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, instructor_id, title, description, sort_order, \
                        duration_mins, video_url, resources, quiz, is_preview, is_published, \
                        created_at, updated_at";

/// Provides CRUD operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Insert a lesson and refresh every enrollment's progress in its course,
    /// since the lesson total just grew.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO lessons
                (course_id, instructor_id, title, description, sort_order, duration_mins,
                 video_url, resources, quiz, is_preview, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, false), COALESCE($11, false))
             RETURNING {COLUMNS}"
        );
        let lesson = sqlx::query_as::<_, Lesson>(&query)
            .bind(input.course_id)
            .bind(instructor_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.duration_mins)
            .bind(&input.video_url)
            .bind(Json(&input.resources))
            .bind(Json(&input.quiz))
            .bind(input.is_preview)
            .bind(input.is_published)
            .fetch_one(&mut *tx)
            .await?;

        EnrollmentRepo::refresh_course_progress(&mut tx, lesson.course_id).await?;

        tx.commit().await?;
        Ok(lesson)
    }

    /// Find a lesson by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All lessons of a course in display order.
    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Lesson>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lessons WHERE course_id = $1 ORDER BY sort_order ASC");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// The lesson that follows `sort_order` in the same course, if any.
    pub async fn find_next_id(
        pool: &PgPool,
        course_id: DbId,
        sort_order: i32,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM lessons
             WHERE course_id = $1 AND sort_order > $2
             ORDER BY sort_order ASC
             LIMIT 1",
        )
        .bind(course_id)
        .bind(sort_order)
        .fetch_optional(pool)
        .await
    }

    /// Update a lesson. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                sort_order = COALESCE($4, sort_order),
                duration_mins = COALESCE($5, duration_mins),
                video_url = COALESCE($6, video_url),
                resources = COALESCE($7, resources),
                quiz = COALESCE($8, quiz),
                is_preview = COALESCE($9, is_preview),
                is_published = COALESCE($10, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.duration_mins)
            .bind(&input.video_url)
            .bind(input.resources.as_ref().map(Json))
            .bind(input.quiz.as_ref().map(Json))
            .bind(input.is_preview)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a lesson with its progress rows, then refresh every enrollment's
    /// progress in the course.
    ///
    /// Returns the deleted row, or `None` if it did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM lesson_progress WHERE lesson_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let query = format!("DELETE FROM lessons WHERE id = $1 RETURNING {COLUMNS}");
        let lesson = sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(lesson) = lesson else {
            tx.rollback().await?;
            return Ok(None);
        };

        EnrollmentRepo::refresh_course_progress(&mut tx, lesson.course_id).await?;

        tx.commit().await?;
        Ok(Some(lesson))
    }
}
