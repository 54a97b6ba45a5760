//! Lesson content types and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum lesson title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Minimum number of answer options on a quiz question.
pub const MIN_QUIZ_OPTIONS: usize = 2;

pub const RESOURCE_KINDS: &[&str] = &["pdf", "link", "file"];

/// A multiple-choice question attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Supplementary material linked from a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResource {
    pub title: String,
    pub url: String,
    pub kind: String,
}

/// Lesson order within a course is 1-based.
pub fn validate_sort_order(sort_order: i32) -> Result<(), CoreError> {
    if sort_order < 1 {
        return Err(CoreError::Validation(format!(
            "Lesson order must be a positive integer, got {sort_order}"
        )));
    }
    Ok(())
}

pub fn validate_duration(duration_mins: i32) -> Result<(), CoreError> {
    if duration_mins < 1 {
        return Err(CoreError::Validation(
            "Lesson duration must be at least 1 minute".into(),
        ));
    }
    Ok(())
}

pub fn validate_quiz(questions: &[QuizQuestion]) -> Result<(), CoreError> {
    for (i, q) in questions.iter().enumerate() {
        let n = i + 1;
        if q.question.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Quiz question {n} has no text"
            )));
        }
        if q.options.len() < MIN_QUIZ_OPTIONS {
            return Err(CoreError::Validation(format!(
                "Quiz question {n} needs at least {MIN_QUIZ_OPTIONS} options"
            )));
        }
        if q.correct_answer >= q.options.len() {
            return Err(CoreError::Validation(format!(
                "Quiz question {n} has correct_answer {} but only {} options",
                q.correct_answer,
                q.options.len()
            )));
        }
    }
    Ok(())
}

pub fn validate_resources(resources: &[LessonResource]) -> Result<(), CoreError> {
    for r in resources {
        if !RESOURCE_KINDS.contains(&r.kind.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid resource kind '{}'. Must be one of: {}",
                r.kind,
                RESOURCE_KINDS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Score submitted answers as a rounded percentage of correct responses.
///
/// `answers[i]` answers `questions[i]`; the answer count must match.
pub fn score_quiz(questions: &[QuizQuestion], answers: &[usize]) -> Result<i16, CoreError> {
    if questions.is_empty() {
        return Err(CoreError::Validation("This lesson has no quiz".into()));
    }
    if answers.len() != questions.len() {
        return Err(CoreError::Validation(format!(
            "Expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, &a)| q.correct_answer == a)
        .count() as i64;
    let total = questions.len() as i64;
    Ok(((200 * correct + total) / (2 * total)) as i16)
}
