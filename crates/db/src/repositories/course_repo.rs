//! Repository for the `courses` table and its cascade delete.

use eduhub_core::catalog::CourseSort;
use eduhub_core::course::STATUS_PUBLISHED;
use eduhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{
    Course, CourseDeletion, CourseFilter, CourseWithInstructor, CreateCourse, UpdateCourse,
};

/// Column list shared across queries. Every query aliases `courses` as `c`.
///
/// `is_published` and `total_lessons` are computed, never stored.
pub(crate) const COLUMNS: &str = "c.id, c.title, c.slug, c.description, c.short_description, \
    c.instructor_id, c.category, c.level, c.price, c.discount_price, c.thumbnail_url, \
    c.duration_hours, c.duration_minutes, c.language, c.requirements, c.learning_outcomes, \
    c.tags, c.students_enrolled, c.rating_average, c.rating_count, c.status, \
    (c.status = 'published') AS is_published, c.published_at, c.views, \
    (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS total_lessons, \
    c.created_at, c.updated_at";

/// Instructor summary columns joined onto a course row.
const INSTRUCTOR_COLUMNS: &str = "u.name AS instructor_name, u.avatar_url AS instructor_avatar_url";

/// Shared catalog predicate. `$1` category, `$2` level, `$3` ILIKE pattern.
const CATALOG_WHERE: &str = "c.status = $4 \
    AND ($1::TEXT IS NULL OR c.category = $1) \
    AND ($2::TEXT IS NULL OR c.level = $2) \
    AND ($3::TEXT IS NULL OR c.title ILIKE $3 OR c.description ILIKE $3)";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course in `draft` status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        slug: &str,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses AS c
                (title, slug, description, short_description, instructor_id, category, level,
                 price, discount_price, thumbnail_url, duration_hours, duration_minutes,
                 language, requirements, learning_outcomes, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     COALESCE($11, 0), COALESCE($12, 0), COALESCE($13, 'English'), $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(instructor_id)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.price)
            .bind(input.discount_price)
            .bind(&input.thumbnail_url)
            .bind(input.duration_hours)
            .bind(input.duration_minutes)
            .bind(&input.language)
            .bind(&input.requirements)
            .bind(&input.learning_outcomes)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// Find a course by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses c WHERE c.id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course with its instructor's name and avatar.
    pub async fn find_with_instructor(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CourseWithInstructor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {INSTRUCTOR_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CourseWithInstructor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of the public catalog: published courses matching `filter`,
    /// ordered by `sort`.
    pub async fn list_published(
        pool: &PgPool,
        filter: &CourseFilter,
        sort: CourseSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseWithInstructor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {INSTRUCTOR_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE {CATALOG_WHERE}
             ORDER BY {order}
             LIMIT $5 OFFSET $6",
            order = sort.order_by_clause(),
        );
        sqlx::query_as::<_, CourseWithInstructor>(&query)
            .bind(&filter.category)
            .bind(&filter.level)
            .bind(&filter.search)
            .bind(STATUS_PUBLISHED)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of published courses matching `filter`.
    pub async fn count_published(pool: &PgPool, filter: &CourseFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM courses c WHERE {CATALOG_WHERE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(&filter.category)
            .bind(&filter.level)
            .bind(&filter.search)
            .bind(STATUS_PUBLISHED)
            .fetch_one(pool)
            .await
    }

    /// All courses owned by an instructor, newest first, in any status.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses c
             WHERE c.instructor_id = $1
             ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses AS c SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                category = COALESCE($5, category),
                level = COALESCE($6, level),
                price = COALESCE($7, price),
                discount_price = COALESCE($8, discount_price),
                thumbnail_url = COALESCE($9, thumbnail_url),
                duration_hours = COALESCE($10, duration_hours),
                duration_minutes = COALESCE($11, duration_minutes),
                language = COALESCE($12, language),
                requirements = COALESCE($13, requirements),
                learning_outcomes = COALESCE($14, learning_outcomes),
                tags = COALESCE($15, tags),
                status = COALESCE($16, status),
                published_at = CASE
                    WHEN $16 = 'published' AND status <> 'published' THEN NOW()
                    WHEN $16 IS NOT NULL AND $16 <> 'published' THEN NULL
                    ELSE published_at
                END
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.price)
            .bind(input.discount_price)
            .bind(&input.thumbnail_url)
            .bind(input.duration_hours)
            .bind(input.duration_minutes)
            .bind(&input.language)
            .bind(&input.requirements)
            .bind(&input.learning_outcomes)
            .bind(&input.tags)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Set the publication status, stamping `published_at` when publishing
    /// and clearing it otherwise.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses AS c SET
                status = $2,
                published_at = CASE WHEN $2 = 'published' THEN NOW() ELSE NULL END
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Bump the detail-view counter. Returns `true` if the course exists.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE courses SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a course and everything hanging off it in one transaction.
    ///
    /// Dependents go first so no step leaves a row pointing at a missing
    /// course. Returns `None` (and writes nothing) if the course does not exist.
    pub async fn delete_cascade(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CourseDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        // Bookmarks cascade from their progress rows.
        let progress_rows_deleted = sqlx::query("DELETE FROM lesson_progress WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let completions_removed = sqlx::query("DELETE FROM course_completions WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let enrollments_removed = sqlx::query("DELETE FROM enrollments WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let reviews_deleted = sqlx::query("DELETE FROM course_reviews WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let lessons_deleted = sqlx::query("DELETE FROM lessons WHERE course_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(CourseDeletion {
            progress_rows_deleted,
            enrollments_removed,
            completions_removed,
            lessons_deleted,
            reviews_deleted,
        }))
    }
}
