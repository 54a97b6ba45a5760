//! Course review validation.

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const MAX_COMMENT_LEN: usize = 500;

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::InvalidRange {
            field: "rating",
            value: i64::from(rating),
            min: i64::from(MIN_RATING),
            max: i64::from(MAX_RATING),
        })
    }
}

pub fn validate_comment(comment: Option<&str>) -> Result<(), CoreError> {
    match comment {
        Some(c) if c.chars().count() > MAX_COMMENT_LEN => Err(CoreError::Validation(format!(
            "Review comment cannot be more than {MAX_COMMENT_LEN} characters"
        ))),
        _ => Ok(()),
    }
}
