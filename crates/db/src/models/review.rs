//! Course review model and DTOs.

use eduhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A review joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub course_id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for submitting a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub rating: i16,
    pub comment: Option<String>,
}
