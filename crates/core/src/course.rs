//! Course catalog vocabulary and lifecycle rules.
//!
//! Categories, levels and statuses are stored as text and validated here so
//! the database CHECK constraints and the API agree on a single list.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories and levels
// ---------------------------------------------------------------------------

pub const VALID_CATEGORIES: &[&str] = &[
    "Programming",
    "Design",
    "Business",
    "Marketing",
    "Data Science",
    "Mobile Development",
    "Web Development",
    "DevOps",
    "Cybersecurity",
    "AI/ML",
    "Other",
];

pub const LEVEL_BEGINNER: &str = "Beginner";
pub const LEVEL_INTERMEDIATE: &str = "Intermediate";
pub const LEVEL_ADVANCED: &str = "Advanced";

pub const VALID_LEVELS: &[&str] = &[LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )))
    }
}

pub fn validate_level(level: &str) -> Result<(), CoreError> {
    if VALID_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid level '{level}'. Must be one of: {}",
            VALID_LEVELS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

/// Initial status of every new course.
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_ARCHIVED: &str = "archived";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_PENDING,
    STATUS_PUBLISHED,
    STATUS_ARCHIVED,
];

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// `isPublished` is a pure function of the status.
pub fn is_published(status: &str) -> bool {
    status == STATUS_PUBLISHED
}

/// Result of flipping a course's publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationToggle {
    pub status: &'static str,
    pub is_published: bool,
}

/// Flip publication: a published course goes back to draft, anything else
/// (draft, pending, archived) becomes published.
pub fn toggle_publication(current_status: &str) -> PublicationToggle {
    if is_published(current_status) {
        PublicationToggle {
            status: STATUS_DRAFT,
            is_published: false,
        }
    } else {
        PublicationToggle {
            status: STATUS_PUBLISHED,
            is_published: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Pricing and presentation
// ---------------------------------------------------------------------------

pub fn validate_pricing(price: f64, discount_price: Option<f64>) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation("Price cannot be negative".into()));
    }
    if let Some(discount) = discount_price {
        if !discount.is_finite() || discount < 0.0 {
            return Err(CoreError::Validation(
                "Discount price cannot be negative".into(),
            ));
        }
    }
    Ok(())
}

/// Lower-case, hyphen-separated form of a title. Falls back to `"course"`
/// when the title contains no alphanumeric characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "course".to_string()
    } else {
        slug
    }
}

/// Slug with a short random suffix so two courses with the same title do not
/// collide on `uq_courses_slug`.
pub fn unique_slug(title: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slugify(title), &suffix[..8])
}

/// Human-readable course length, e.g. `"2 hours 15 minutes"`.
pub fn format_duration(hours: i32, minutes: i32) -> String {
    let plural = if hours > 1 { "s" } else { "" };
    match (hours, minutes) {
        (0, m) => format!("{m} minutes"),
        (h, 0) => format!("{h} hour{plural}"),
        (h, m) => format!("{h} hour{plural} {m} minutes"),
    }
}
