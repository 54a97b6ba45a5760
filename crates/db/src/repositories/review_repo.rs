//! Repository for the `course_reviews` table.

use eduhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review};

/// Review columns joined with the reviewer's display name.
const SELECT_REVIEW: &str = "SELECT r.id, r.course_id, r.user_id, u.name AS user_name, \
                              r.rating, r.comment, r.created_at \
                              FROM course_reviews r JOIN users u ON u.id = r.user_id";

/// Provides review submission and listing.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review and recompute the course's rating aggregate in the
    /// same transaction.
    ///
    /// Returns `None` if the user has already reviewed the course.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        user_id: DbId,
        input: &CreateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO course_reviews (course_id, user_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_course_reviews_course_user DO NOTHING
             RETURNING id",
        )
        .bind(course_id)
        .bind(user_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = id else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE courses SET
                rating_average = agg.average,
                rating_count = agg.count
             FROM (
                SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS average,
                       COUNT(*)::INTEGER AS count
                FROM course_reviews WHERE course_id = $1
             ) agg
             WHERE courses.id = $1",
        )
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        let query = format!("{SELECT_REVIEW} WHERE r.id = $1");
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(review))
    }

    /// Reviews of a course, newest first.
    pub async fn list_for_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("{SELECT_REVIEW} WHERE r.course_id = $1 ORDER BY r.created_at DESC, r.id DESC");
        sqlx::query_as::<_, Review>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }
}
