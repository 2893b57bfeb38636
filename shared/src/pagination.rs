//! Pagination types shared by list endpoints

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on the page size a client can ask for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page request (`?page=1&limit=10`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }.normalized()
    }

    /// Clamp page to >= 1 and limit to 1..=MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

/// Pagination metadata returned next to a page of data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, 1-based
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total matching records
    pub total: u64,
    /// Total pages
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(limit as u64) as u32
        } else {
            1
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A page of records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, query: PageQuery) -> Self {
        Self {
            data,
            pagination: Pagination::new(query.page, query.limit, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(2, 10, 101);
        assert_eq!(p.total_pages, 11);
        assert_eq!(Pagination::new(1, 10, 100).total_pages, 10);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageQuery::new(1, 10).offset(), 0);
        assert_eq!(PageQuery::new(3, 25).offset(), 50);
        assert_eq!(PageQuery::new(0, 10).offset(), 0);
    }

    #[test]
    fn test_offset_far_page_does_not_overflow() {
        let q = PageQuery { page: u32::MAX, limit: u32::MAX }.normalized();
        assert_eq!(q.offset(), u64::from(u32::MAX - 1) * u64::from(MAX_PAGE_SIZE));
        assert_eq!(PageQuery::new(50_000_000, 100).offset(), 4_999_999_900);
    }

    #[test]
    fn test_normalized_clamps_limit() {
        let q = PageQuery { page: 0, limit: 10_000 }.normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, MAX_PAGE_SIZE);
        assert_eq!(PageQuery { page: 1, limit: 0 }.normalized().limit, 1);
    }

    #[test]
    fn test_serialized_shape() {
        let resp = PaginatedResponse::new(vec![1, 2], 12, PageQuery::new(1, 2));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["pagination"]["totalPages"], 6);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }
}
