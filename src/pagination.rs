//! Viewport-driven row pagination.
//!
//! The property rows are split into pages that fit the available viewport
//! height. Page size follows density, price-row visibility and viewport
//! changes; the current page is clamped when the page count shrinks and
//! reset to the first page whenever the filtered row count changes.
//!
//! ```
//! use u_planning::pagination::Paginator;
//!
//! let mut pager = Paginator::default();
//! pager.update(23, 68.0, 700.0);
//! assert_eq!(pager.page_size(), 10);
//! assert_eq!(pager.total_pages(), 3);
//! pager.go_to(2);
//! assert_eq!(pager.page_range(), 20..23);
//! ```

use std::ops::Range;

/// Rows that fit in `available_height`, at least one.
pub fn page_size(available_height: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || available_height <= 0.0 {
        return 1;
    }
    ((available_height / row_height).floor() as usize).max(1)
}

/// Pages needed for `row_count` rows.
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1))
}

/// Current page over a filtered row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
    row_count: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 1,
            row_count: 0,
        }
    }
}

impl Paginator {
    /// Recomputes paging after a filter, density or viewport change.
    ///
    /// `available_height` is the viewport height minus fixed chrome.
    pub fn update(&mut self, row_count: usize, row_height: f64, available_height: f64) {
        if row_count != self.row_count {
            self.page = 0;
        }
        self.row_count = row_count;
        self.page_size = page_size(available_height, row_height);
        self.clamp();
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Filtered row count.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of pages (0 when there are no rows).
    pub fn total_pages(&self) -> usize {
        total_pages(self.row_count, self.page_size)
    }

    /// Row indices on the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.row_count);
        let end = (start + self.page_size).min(self.row_count);
        start..end
    }

    /// Slices the rows for the current page.
    pub fn page_of<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let range = self.page_range();
        let end = range.end.min(rows.len());
        &rows[range.start.min(end)..end]
    }

    /// Goes to `page`, clamped to the last page.
    pub fn go_to(&mut self, page: usize) {
        self.page = page;
        self.clamp();
    }

    /// Advances one page. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        let before = self.page;
        self.go_to(self.page + 1);
        self.page != before
    }

    /// Goes back one page. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        let before = self.page;
        self.page = self.page.saturating_sub(1);
        self.page != before
    }

    fn clamp(&mut self) {
        let last = self.total_pages().saturating_sub(1);
        self.page = self.page.min(last);
    }
}
