//! Course progress arithmetic and progress-related validation.
//!
//! The per-enrollment progress percentage is a cache derived from lesson
//! completion rows. [`course_progress`] is the only formula used to fill it.

use crate::error::CoreError;
use crate::types::DbId;

/// Lowest valid progress percentage.
pub const MIN_PROGRESS: i16 = 0;

/// Highest valid progress percentage; reaching it marks the course completed.
pub const MAX_PROGRESS: i16 = 100;

/// Maximum length of a bookmark note, in characters.
pub const MAX_BOOKMARK_NOTE_LEN: usize = 500;

/// Maximum length of free-form lesson notes, in characters.
pub const MAX_LESSON_NOTES_LEN: usize = 1000;

/// Percentage of completed lessons, rounded half-up.
///
/// Returns 0 for a course without lessons. `completed` above `total` (a stale
/// row racing a lesson delete) is clamped to 100.
pub fn course_progress(completed: i64, total: i64) -> i16 {
    if total <= 0 || completed <= 0 {
        return MIN_PROGRESS;
    }
    let completed = completed.min(total);
    // round(100 * c / t) for non-negative integers, half-up.
    let pct = (200 * completed + total) / (2 * total);
    pct as i16
}

/// Reject progress values outside `[0, 100]`.
pub fn validate_progress(value: i64) -> Result<i16, CoreError> {
    if (i64::from(MIN_PROGRESS)..=i64::from(MAX_PROGRESS)).contains(&value) {
        Ok(value as i16)
    } else {
        Err(CoreError::InvalidRange {
            field: "progress",
            value,
            min: i64::from(MIN_PROGRESS),
            max: i64::from(MAX_PROGRESS),
        })
    }
}

/// How a progress value affects the user's completed-course list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionChange {
    /// Progress is 100: the course belongs in the completed list.
    Add,
    /// Progress is below 100: the course must not be in the completed list.
    Remove,
}

pub fn completion_change(progress: i16) -> CompletionChange {
    if progress >= MAX_PROGRESS {
        CompletionChange::Add
    } else {
        CompletionChange::Remove
    }
}

/// Check a client-supplied percentage against the value derived from lesson
/// completions.
///
/// A course with lessons has exactly one valid progress value per user, the
/// derived one. Courses without lessons have nothing to derive from, so any
/// in-range value is accepted.
pub fn reconcile_direct_progress(
    course_id: DbId,
    requested: i16,
    completed: i64,
    total: i64,
) -> Result<i16, CoreError> {
    if total == 0 {
        return Ok(requested);
    }
    let derived = course_progress(completed, total);
    if derived == requested {
        Ok(derived)
    } else {
        Err(CoreError::Validation(format!(
            "Progress {requested} for course {course_id} disagrees with completed lessons \
             ({completed} of {total}, {derived}%)"
        )))
    }
}

pub fn validate_watch_time(seconds: i64) -> Result<(), CoreError> {
    if seconds < 0 {
        return Err(CoreError::Validation(
            "Watch time cannot be negative".into(),
        ));
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<(), CoreError> {
    if notes.chars().count() > MAX_LESSON_NOTES_LEN {
        return Err(CoreError::Validation(format!(
            "Notes cannot be more than {MAX_LESSON_NOTES_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_bookmark(timestamp_secs: i32, note: Option<&str>) -> Result<(), CoreError> {
    if timestamp_secs < 0 {
        return Err(CoreError::Validation(
            "Bookmark timestamp cannot be negative".into(),
        ));
    }
    if let Some(note) = note {
        if note.chars().count() > MAX_BOOKMARK_NOTE_LEN {
            return Err(CoreError::Validation(format!(
                "Bookmark note cannot be more than {MAX_BOOKMARK_NOTE_LEN} characters"
            )));
        }
    }
    Ok(())
}
