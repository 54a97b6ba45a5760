//! Catalog listing helpers: pagination math, filter normalisation and the
//! whitelist of sort orders accepted from query strings.

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Default number of courses per catalog page.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a 1-based page number; missing or non-positive values become 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a page size into `[1, MAX_PAGE_SIZE]`, defaulting when absent.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Row offset of the first item on `page`. Saturates instead of
/// overflowing, so an absurd page number yields an empty page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size.max(0))
}

/// Number of pages needed for `total` items: `ceil(total / page_size)`.
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// The catalog UI sends `"all"` for an unset dropdown.
pub const ALL_FILTER: &str = "all";

/// Normalise an optional filter value: blank and `"all"` mean no filter.
pub fn normalize_filter(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_FILTER))
}

/// Build an `ILIKE` pattern for case-insensitive substring search, escaping
/// the LIKE metacharacters in user input.
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sortable catalog columns. Parsing from user input goes through this enum
/// so only fixed SQL fragments ever reach a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Price,
    Rating,
    StudentsEnrolled,
    Title,
    Views,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "c.created_at",
            SortField::Price => "c.price",
            SortField::Rating => "c.rating_average",
            SortField::StudentsEnrolled => "c.students_enrolled",
            SortField::Title => "c.title",
            SortField::Views => "c.views",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "created_at" | "createdAt" => Some(SortField::CreatedAt),
            "price" => Some(SortField::Price),
            "rating" | "rating_average" => Some(SortField::Rating),
            "students_enrolled" | "studentsEnrolled" => Some(SortField::StudentsEnrolled),
            "title" => Some(SortField::Title),
            "views" => Some(SortField::Views),
            _ => None,
        }
    }
}

/// A parsed `sort` query parameter: a field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for CourseSort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl CourseSort {
    /// Parse `"-price"` / `"title"` style values. A leading `-` means
    /// descending. Unknown fields fall back to the default order.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::default();
        };
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        match SortField::from_key(key) {
            Some(field) => Self { field, descending },
            None => Self::default(),
        }
    }

    /// SQL `ORDER BY` body. Ties break on id so pagination is stable.
    pub fn order_by_clause(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!("{} {dir}, c.id {dir}", self.field.column())
    }
}
