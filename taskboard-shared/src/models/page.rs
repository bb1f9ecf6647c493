/// Offset pagination types
///
/// Pages are zero-indexed and of fixed size. A page index past the last
/// page is valid and simply yields no content.

use serde::Serialize;

/// Default page index when the caller does not provide one
pub const DEFAULT_PAGE: u32 = 0;

/// Default page size when the caller does not provide one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// A request for one page of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,

    /// Number of items per page (at least 1)
    pub size: u32,
}

impl PageRequest {
    /// Creates a page request
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Number of rows to return
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus totals for the whole result set
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub content: Vec<T>,

    /// Zero-based page index
    pub page: u32,

    /// Requested page size
    pub size: u32,

    /// Number of matching items across all pages
    pub total_elements: i64,

    /// Number of pages needed to hold `total_elements`
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Builds a page from its content and the total match count
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.size);
        let total_pages = if size == 0 {
            0
        } else {
            (total_elements + size - 1) / size
        };

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    /// True when this page holds no items
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
