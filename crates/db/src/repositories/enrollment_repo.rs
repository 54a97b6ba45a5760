//! Repository for enrollments, course completions and the derived progress
//! cache kept on each enrollment.

use eduhub_core::error::CoreError;
use eduhub_core::progress::{
    completion_change, course_progress, reconcile_direct_progress, CompletionChange,
};
use eduhub_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::course::EnrollmentCounts;
use crate::models::enrollment::{
    CourseCompletion, EnrolledCourse, EnrolledStudent, Enrollment, ProgressUpdate,
    RecentEnrollment, Unenrollment,
};
use crate::repositories::course_repo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, course_id, enrolled_at, progress";

/// Result of a client-supplied progress write.
#[derive(Debug)]
pub enum DirectProgressOutcome {
    Updated(ProgressUpdate),
    NotEnrolled,
    /// The value disagreed with completed lessons; nothing was written.
    Rejected(CoreError),
}

/// Provides the enrollment lifecycle and enrollment read models.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a user in a course and bump the course's counter.
    ///
    /// Returns `None` if the user is already enrolled; in that case neither
    /// table is touched. The unique constraint makes concurrent calls for the
    /// same pair produce exactly one row and one increment.
    pub async fn enroll(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO enrollments (user_id, course_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_enrollments_user_course DO NOTHING
             RETURNING {COLUMNS}"
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(enrollment) = enrollment else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE courses SET students_enrolled = students_enrolled + 1 WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(enrollment))
    }

    /// Remove an enrollment together with the user's progress rows and
    /// completion entry for the course. The counter never drops below zero.
    ///
    /// Returns `None` if the user was not enrolled.
    pub async fn unenroll(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Unenrollment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "UPDATE courses SET students_enrolled = GREATEST(students_enrolled - 1, 0)
             WHERE id = $1",
        )
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        let progress_rows_deleted =
            sqlx::query("DELETE FROM lesson_progress WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let completion_removed =
            sqlx::query("DELETE FROM course_completions WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?
                .rows_affected()
                > 0;

        tx.commit().await?;
        Ok(Some(Unenrollment {
            progress_rows_deleted,
            completion_removed,
        }))
    }

    /// Find the enrollment for a (user, course) pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// A student's enrolled courses, most recent enrollment first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
        let query = format!(
            "SELECT {cols}, u.name AS instructor_name,
                    e.enrolled_at, e.progress, (e.progress >= 100) AS is_completed
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN users u ON u.id = c.instructor_id
             WHERE e.user_id = $1
             ORDER BY e.enrolled_at DESC, e.id DESC",
            cols = course_repo::COLUMNS,
        );
        sqlx::query_as::<_, EnrolledCourse>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Students enrolled in a course, most recent enrollment first.
    pub async fn list_students(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudent>(
            "SELECT u.id AS user_id, u.name, u.email, u.avatar_url,
                    e.enrolled_at, e.progress, (e.progress >= 100) AS is_completed
             FROM enrollments e
             JOIN users u ON u.id = e.user_id
             WHERE e.course_id = $1
             ORDER BY e.enrolled_at DESC, e.id DESC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Enrolled and completed student counts for each of an instructor's courses.
    pub async fn counts_for_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<EnrollmentCounts>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentCounts>(
            "SELECT c.id AS course_id,
                    COUNT(e.id) AS enrolled,
                    COUNT(e.id) FILTER (WHERE e.progress >= 100) AS completed
             FROM courses c
             LEFT JOIN enrollments e ON e.course_id = c.id
             WHERE c.instructor_id = $1
             GROUP BY c.id",
        )
        .bind(instructor_id)
        .fetch_all(pool)
        .await
    }

    /// The most recent enrollments across all of an instructor's courses.
    pub async fn recent_for_instructor(
        pool: &PgPool,
        instructor_id: DbId,
        limit: i64,
    ) -> Result<Vec<RecentEnrollment>, sqlx::Error> {
        sqlx::query_as::<_, RecentEnrollment>(
            "SELECT u.id AS user_id, u.name, u.email, u.avatar_url,
                    c.id AS course_id, c.title AS course_title,
                    e.enrolled_at, e.progress
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN users u ON u.id = e.user_id
             WHERE c.instructor_id = $1
             ORDER BY e.enrolled_at DESC, e.id DESC
             LIMIT $2",
        )
        .bind(instructor_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Courses the user has completed.
    pub async fn list_completions(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CourseCompletion>, sqlx::Error> {
        sqlx::query_as::<_, CourseCompletion>(
            "SELECT user_id, course_id, completed_at FROM course_completions
             WHERE user_id = $1
             ORDER BY completed_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Client-supplied progress write, checked against completed lessons.
    ///
    /// The enrollment row is locked for the duration so a concurrent lesson
    /// completion cannot slip in between the check and the write.
    pub async fn set_progress(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        requested: i16,
    ) -> Result<DirectProgressOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::lock_enrollment(&mut tx, user_id, course_id).await? {
            tx.rollback().await?;
            return Ok(DirectProgressOutcome::NotEnrolled);
        }

        let total = Self::count_lessons(&mut tx, course_id).await?;
        let completed = Self::count_completed(&mut tx, user_id, course_id).await?;

        let progress = match reconcile_direct_progress(course_id, requested, completed, total) {
            Ok(p) => p,
            Err(e) => {
                tx.rollback().await?;
                return Ok(DirectProgressOutcome::Rejected(e));
            }
        };

        let update = Self::write_progress(&mut tx, user_id, course_id, progress).await?;
        tx.commit().await?;

        Ok(match update {
            Some(update) => DirectProgressOutcome::Updated(update),
            None => DirectProgressOutcome::NotEnrolled,
        })
    }

    // -----------------------------------------------------------------------
    // Transaction helpers shared with the lesson and progress repositories
    // -----------------------------------------------------------------------

    /// Take a row lock on the enrollment. Returns `false` if there is none.
    pub(crate) async fn lock_enrollment(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let id = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM enrollments WHERE user_id = $1 AND course_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(id.is_some())
    }

    pub(crate) async fn count_lessons(
        tx: &mut Transaction<'_, Postgres>,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn count_completed(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lesson_progress
             WHERE user_id = $1 AND course_id = $2 AND is_completed",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Store a progress value on the enrollment and make the completion
    /// entry agree with it. Returns `None` if the enrollment is gone.
    pub(crate) async fn write_progress(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        course_id: DbId,
        progress: i16,
    ) -> Result<Option<ProgressUpdate>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET progress = $3
             WHERE user_id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(progress)
            .fetch_optional(&mut **tx)
            .await?;

        let Some(enrollment) = enrollment else {
            return Ok(None);
        };

        let course_completed = match completion_change(progress) {
            CompletionChange::Add => {
                sqlx::query(
                    "INSERT INTO course_completions (user_id, course_id) VALUES ($1, $2)
                     ON CONFLICT (user_id, course_id) DO NOTHING",
                )
                .bind(user_id)
                .bind(course_id)
                .execute(&mut **tx)
                .await?;
                true
            }
            CompletionChange::Remove => {
                sqlx::query(
                    "DELETE FROM course_completions WHERE user_id = $1 AND course_id = $2",
                )
                .bind(user_id)
                .bind(course_id)
                .execute(&mut **tx)
                .await?;
                false
            }
        };

        Ok(Some(ProgressUpdate {
            enrollment,
            course_completed,
        }))
    }

    /// Recompute the derived progress of every enrollment in a course.
    ///
    /// Called after the lesson count changes. Returns the number of
    /// enrollments refreshed.
    pub(crate) async fn refresh_course_progress(
        tx: &mut Transaction<'_, Postgres>,
        course_id: DbId,
    ) -> Result<usize, sqlx::Error> {
        let total = Self::count_lessons(tx, course_id).await?;
        let rows = sqlx::query_as::<_, (DbId, i64)>(
            "SELECT e.user_id, COUNT(lp.id)
             FROM enrollments e
             LEFT JOIN lesson_progress lp
                ON lp.user_id = e.user_id AND lp.course_id = e.course_id AND lp.is_completed
             WHERE e.course_id = $1
             GROUP BY e.user_id",
        )
        .bind(course_id)
        .fetch_all(&mut **tx)
        .await?;

        for &(user_id, completed) in &rows {
            Self::write_progress(tx, user_id, course_id, course_progress(completed, total)).await?;
        }
        tracing::debug!(
            course_id,
            total_lessons = total,
            enrollments = rows.len(),
            "Course progress refreshed",
        );
        Ok(rows.len())
    }
}
