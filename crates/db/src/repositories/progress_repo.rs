//! Repository for per-lesson progress rows and their bookmarks.

use eduhub_core::progress::course_progress;
use eduhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson::Lesson;
use crate::models::progress::{
    Bookmark, CreateBookmark, LessonCompletion, LessonProgress, UpdateLessonProgress,
};
use crate::repositories::EnrollmentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, course_id, lesson_id, is_completed, completed_at, \
                        watch_time_secs, last_watched_at, quiz_score, notes, created_at, updated_at";

const BOOKMARK_COLUMNS: &str = "b.id, b.progress_id, b.timestamp_secs, b.note, b.created_at";

/// Provides progress tracking for enrolled users.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Mark a lesson completed for a user and recompute their course progress.
    ///
    /// Idempotent: completing an already-completed lesson only refreshes
    /// `completed_at`. Returns `None` (and writes nothing) if the user is not
    /// enrolled in the lesson's course.
    pub async fn complete_lesson(
        pool: &PgPool,
        user_id: DbId,
        lesson: &Lesson,
    ) -> Result<Option<LessonCompletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EnrollmentRepo::lock_enrollment(&mut tx, user_id, lesson.course_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO lesson_progress (user_id, course_id, lesson_id, is_completed, completed_at)
             VALUES ($1, $2, $3, true, NOW())
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_user_lesson DO UPDATE SET
                is_completed = true,
                completed_at = NOW(),
                last_watched_at = NOW()
             RETURNING {COLUMNS}"
        );
        let progress = sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(lesson.course_id)
            .bind(lesson.id)
            .fetch_one(&mut *tx)
            .await?;

        let total = EnrollmentRepo::count_lessons(&mut tx, lesson.course_id).await?;
        let completed = EnrollmentRepo::count_completed(&mut tx, user_id, lesson.course_id).await?;
        let pct = course_progress(completed, total);

        let update = EnrollmentRepo::write_progress(&mut tx, user_id, lesson.course_id, pct).await?;
        tx.commit().await?;

        Ok(Some(LessonCompletion {
            progress,
            course_progress: pct,
            course_completed: update.is_some_and(|u| u.course_completed),
        }))
    }

    /// Find the user's progress row for a lesson.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<LessonProgress>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2");
        sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's progress rows for a course, in lesson order.
    pub async fn list_for_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<LessonProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM lesson_progress p
             JOIN lessons l ON l.id = p.lesson_id
             WHERE p.user_id = $1 AND p.course_id = $2
             ORDER BY l.sort_order ASC",
            cols = prefixed_columns("p"),
        );
        sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Record watch time and notes, creating the progress row on first use.
    /// `None` fields keep their stored value. Returns `None` (and writes
    /// nothing) if the user is not enrolled in the lesson's course.
    pub async fn update_watch(
        pool: &PgPool,
        user_id: DbId,
        lesson: &Lesson,
        input: &UpdateLessonProgress,
    ) -> Result<Option<LessonProgress>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EnrollmentRepo::lock_enrollment(&mut tx, user_id, lesson.course_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO lesson_progress (user_id, course_id, lesson_id, watch_time_secs, notes)
             VALUES ($1, $2, $3, COALESCE($4, 0), $5)
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_user_lesson DO UPDATE SET
                watch_time_secs = COALESCE($4, lesson_progress.watch_time_secs),
                notes = COALESCE($5, lesson_progress.notes),
                last_watched_at = NOW()
             RETURNING {COLUMNS}"
        );
        let progress = sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(lesson.course_id)
            .bind(lesson.id)
            .bind(input.watch_time_secs)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(progress))
    }

    /// Store the latest quiz score for a lesson. `None` if not enrolled.
    pub async fn record_quiz_score(
        pool: &PgPool,
        user_id: DbId,
        lesson: &Lesson,
        score: i16,
    ) -> Result<Option<LessonProgress>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EnrollmentRepo::lock_enrollment(&mut tx, user_id, lesson.course_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO lesson_progress (user_id, course_id, lesson_id, quiz_score)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_user_lesson DO UPDATE SET
                quiz_score = EXCLUDED.quiz_score
             RETURNING {COLUMNS}"
        );
        let progress = sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(lesson.course_id)
            .bind(lesson.id)
            .bind(score)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(progress))
    }

    /// Add a bookmark, creating the progress row on first use. `None` if
    /// not enrolled.
    pub async fn add_bookmark(
        pool: &PgPool,
        user_id: DbId,
        lesson: &Lesson,
        input: &CreateBookmark,
    ) -> Result<Option<Bookmark>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EnrollmentRepo::lock_enrollment(&mut tx, user_id, lesson.course_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        // The no-op update makes RETURNING yield the id on conflict too.
        let progress_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO lesson_progress (user_id, course_id, lesson_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_user_lesson DO UPDATE SET
                last_watched_at = lesson_progress.last_watched_at
             RETURNING id",
        )
        .bind(user_id)
        .bind(lesson.course_id)
        .bind(lesson.id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO progress_bookmarks AS b (progress_id, timestamp_secs, note)
             VALUES ($1, $2, $3)
             RETURNING {BOOKMARK_COLUMNS}"
        );
        let bookmark = sqlx::query_as::<_, Bookmark>(&query)
            .bind(progress_id)
            .bind(input.timestamp_secs)
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(bookmark))
    }

    /// The user's bookmarks on a lesson, ordered by video position.
    pub async fn list_bookmarks(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Vec<Bookmark>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM progress_bookmarks b
             JOIN lesson_progress p ON p.id = b.progress_id
             WHERE p.user_id = $1 AND p.lesson_id = $2
             ORDER BY b.timestamp_secs ASC, b.id ASC"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_all(pool)
            .await
    }

    /// Delete one of the user's bookmarks on a lesson. Returns `true` if removed.
    pub async fn delete_bookmark(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
        bookmark_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM progress_bookmarks b
             USING lesson_progress p
             WHERE b.id = $3 AND b.progress_id = p.id
               AND p.user_id = $1 AND p.lesson_id = $2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(bookmark_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn prefixed_columns(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
