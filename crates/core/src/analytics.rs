//! Read-side aggregation for instructor dashboards and course analytics.

use serde::Serialize;

use crate::progress::MAX_PROGRESS;
use crate::types::Timestamp;

/// Number of recent enrollments surfaced on dashboards.
pub const RECENT_ENROLLMENTS_LIMIT: usize = 10;

/// Distribution of enrolled students' progress over four quartile buckets.
///
/// Buckets are half-open except the last, which includes 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressHistogram {
    #[serde(rename = "0-25")]
    pub q1: i64,
    #[serde(rename = "25-50")]
    pub q2: i64,
    #[serde(rename = "50-75")]
    pub q3: i64,
    #[serde(rename = "75-100")]
    pub q4: i64,
}

impl ProgressHistogram {
    pub fn from_progress<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i16>,
    {
        let mut hist = Self::default();
        for p in values {
            match p {
                i16::MIN..=24 => hist.q1 += 1,
                25..=49 => hist.q2 += 1,
                50..=74 => hist.q3 += 1,
                _ => hist.q4 += 1,
            }
        }
        hist
    }

    pub fn total(&self) -> i64 {
        self.q1 + self.q2 + self.q3 + self.q4
    }
}

/// Share of completed students as a rounded percentage; 0 with no students.
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    (200 * completed + total) / (2 * total)
}

/// Mean progress, rounded half-up; 0 for an empty set.
pub fn average_progress(values: &[i16]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let n = values.len() as i64;
    (2 * sum + n) / (2 * n)
}

/// Whether an enrollment counts as completed.
pub fn is_completed(progress: i16) -> bool {
    progress >= MAX_PROGRESS
}

/// Round a rating average to one decimal place.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of course rating averages, rounded to one decimal; 0 without courses.
pub fn average_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    round_rating(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

/// Keep the `limit` most recent items by `enrolled_at`, newest first.
pub fn most_recent<T, F>(mut items: Vec<T>, limit: usize, enrolled_at: F) -> Vec<T>
where
    F: Fn(&T) -> Timestamp,
{
    items.sort_by_key(|item| std::cmp::Reverse(enrolled_at(item)));
    items.truncate(limit);
    items
}
