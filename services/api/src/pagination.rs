//! Pagination engine
//!
//! Every list endpoint returns the same page envelope:
//! `{ items, page, limit, totalItems, totalPages, hasNextPage, hasPrevPage }`.
//!
//! Query parsing is deliberately permissive: a non-numeric or non-positive
//! `page`/`limit` falls back to the default instead of being rejected.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw pagination and sorting query parameters, as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortType")]
    pub sort_type: Option<String>,
}

/// Validated pagination window
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl From<&PageQuery> for PageParams {
    fn from(query: &PageQuery) -> Self {
        Self {
            page: coerce(query.page.as_deref(), DEFAULT_PAGE),
            limit: coerce(query.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }
}

/// Coerce a raw query value to a positive integer, defaulting on garbage
fn coerce(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(u32::MAX as i64) as u32)
        .unwrap_or(default)
}

/// The normalized page envelope returned by all list endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_items: i64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items as u64).div_ceil(params.limit as u64) as u32
        };

        Self {
            items,
            page: params.page,
            limit: params.limit,
            total_items,
            total_pages,
            has_next_page: params.page < total_pages,
            has_prev_page: params.page > 1 && total_items > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, limit: u32) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn test_coercion_is_permissive() {
        let cases = [
            (None, None, 1, 10),
            (Some("3"), Some("25"), 3, 25),
            (Some("abc"), Some("xyz"), 1, 10),
            (Some("-2"), Some("0"), 1, 10),
            (Some("0"), Some("-10"), 1, 10),
            (Some(" 2 "), Some("5"), 2, 5),
            (Some("1"), Some("9999"), 1, MAX_LIMIT),
        ];

        for (page, limit, want_page, want_limit) in cases {
            let query = PageQuery {
                page: page.map(String::from),
                limit: limit.map(String::from),
                ..Default::default()
            };
            let p = PageParams::from(&query);
            assert_eq!(p.page, want_page, "page for {:?}", page);
            assert_eq!(p.limit, want_limit, "limit for {:?}", limit);
        }
    }

    #[test]
    fn test_offset() {
        assert_eq!(params(1, 10).offset(), 0);
        assert_eq!(params(3, 10).offset(), 20);
        assert_eq!(params(2, 25).offset(), 25);
    }

    #[test]
    fn test_empty_page_is_success_shaped() {
        let page: Page<i32> = Page::new(vec![], params(1, 10), 0);
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
    }

    #[test]
    fn test_empty_result_beyond_first_page_keeps_flags_false() {
        let page: Page<i32> = Page::new(vec![], params(5, 10), 0);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
    }

    #[test]
    fn test_page_math() {
        // 45 items, 10 per page -> 5 pages
        let page: Page<i32> = Page::new(vec![0; 10], params(2, 10), 45);
        assert_eq!(page.total_pages, 5);
        assert!(page.has_next_page);
        assert!(page.has_prev_page);

        let last: Page<i32> = Page::new(vec![0; 5], params(5, 10), 45);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let first: Page<i32> = Page::new(vec![0; 10], params(1, 10), 45);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);
    }

    #[test]
    fn test_total_pages_zero_iff_total_items_zero() {
        for total in [0i64, 1, 9, 10, 11, 100] {
            let page: Page<i32> = Page::new(vec![], params(1, 10), total);
            assert_eq!(page.total_pages == 0, total == 0, "total = {}", total);
        }
    }
}
