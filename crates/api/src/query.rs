//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Catalog listing parameters (`?page=&limit=&category=&level=&search=&sort=`).
///
/// Values are clamped and normalised with the `eduhub_core::catalog` helpers;
/// `category=all` and `level=all` mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub page: Option<i64>,
    #[serde(alias = "page_size")]
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    /// `created_at`, `-price`, `title`, ... A leading `-` sorts descending.
    pub sort: Option<String>,
}
