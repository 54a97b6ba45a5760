//! Shared response envelope for API handlers.
//!
//! Every successful response is `{ "success": true, ... }` with the payload
//! under `data` and, for lists, `count` (items in this response) plus
//! `total`/`pages`/`page` for paginated listings. Optional keys are omitted
//! rather than sent as `null`.

use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(course)))
/// Ok(Json(ApiResponse::list(lessons)))
/// Ok(Json(ApiResponse::message("Successfully enrolled in course")))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            total: None,
            pages: None,
            page: None,
            data: Some(data),
        }
    }

    /// Attach a human-readable message alongside the payload.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A complete (unpaginated) list.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::ok(items)
        }
    }

    /// One page of a larger result set.
    pub fn page(items: Vec<T>, total: i64, page: i64, pages: i64) -> Self {
        Self {
            total: Some(total),
            pages: Some(pages),
            page: Some(page),
            ..Self::list(items)
        }
    }
}

impl ApiResponse<()> {
    /// A message-only acknowledgement with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            total: None,
            pages: None,
            page: None,
            data: None,
        }
    }
}
