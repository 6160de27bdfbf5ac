//! Pagination envelope shared by every list endpoint.
//!
//! List responses follow the `{ data, meta: { total, page, limit,
//! total_pages } }` convention. Query parameters `page` and `limit` default
//! to 1 and 20 and are clamped to sane bounds.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// `page`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_page() -> i64 {
    DEFAULT_PAGE
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    /// Page clamped to ≥ 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Limit clamped to 1..=100.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// SQL OFFSET for the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination metadata returned alongside list data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Wrap a page of rows with metadata derived from the total row count.
    #[must_use]
    pub fn new(data: Vec<T>, total: i64, params: PageParams) -> Self {
        let limit = params.limit();
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            data,
            meta: PageMeta {
                total,
                page: params.page(),
                limit,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let params = PageParams { page: 0, limit: 0 };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);

        let params = PageParams {
            page: -5,
            limit: 9999,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn test_offset() {
        let params = PageParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams { page: 1, limit: 20 };
        let page = Paginated::new(vec![1, 2, 3], 41, params);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.total, 41);
    }

    #[test]
    fn test_empty_result() {
        let params = PageParams::default();
        let page: Paginated<i32> = Paginated::new(Vec::new(), 0, params);
        assert_eq!(page.meta.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_query_string_parsing() {
        // Axum's Query extractor goes through serde; missing fields default.
        let params: PageParams =
            serde_json::from_str("{}").unwrap_or_default();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
    }
}
