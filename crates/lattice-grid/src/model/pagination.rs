//! Pagination.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Current page (zero-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationModel {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for PaginationModel {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationModel {
    /// Creates a model on `page` with `page_size` rows per page.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Page size used for arithmetic; never zero.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// Number of pages for `row_count` rows.
    pub fn total_pages(&self, row_count: usize) -> usize {
        total_pages(row_count, self.page_size)
    }

    /// Returns the model with `page` clamped into range for `row_count` rows.
    pub fn clamped(self, row_count: usize) -> Self {
        let last = self.total_pages(row_count) - 1;
        Self {
            page: self.page.min(last),
            page_size: self.page_size,
        }
    }

    /// Applies a navigation action and returns the resulting model.
    pub fn apply(self, action: PageAction, row_count: usize) -> Self {
        let last = self.total_pages(row_count) - 1;
        let page = self.page.min(last);
        match action {
            PageAction::First => Self { page: 0, ..self },
            PageAction::Previous => Self {
                page: page.saturating_sub(1),
                ..self
            },
            PageAction::Next => Self {
                page: (page + 1).min(last),
                ..self
            },
            PageAction::Last => Self { page: last, ..self },
            PageAction::GoTo(target) => Self {
                page: target.min(last),
                ..self
            },
            PageAction::SetPageSize(page_size) => Self {
                page: 0,
                page_size: page_size.max(1),
            },
        }
    }
}

/// Navigation request from a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Go to the first page.
    First,
    /// Go back one page.
    Previous,
    /// Go forward one page.
    Next,
    /// Go to the last page.
    Last,
    /// Go to a specific zero-based page.
    GoTo(usize),
    /// Change the page size and return to the first page.
    SetPageSize(usize),
}

/// `max(1, ceil(row_count / page_size))`. A zero page size counts as one.
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1)).max(1)
}

/// Index range of `model`'s page within `row_count` rows.
///
/// The range is empty when the page lies past the end.
pub fn page_bounds(model: &PaginationModel, row_count: usize) -> Range<usize> {
    let size = model.effective_page_size();
    let start = model.page.saturating_mul(size).min(row_count);
    let end = start.saturating_add(size).min(row_count);
    start..end
}

/// Returns the rows of `model`'s page.
pub fn slice<'a, T>(items: &'a [T], model: &PaginationModel) -> &'a [T] {
    &items[page_bounds(model, items.len())]
}

/// Footer text such as `"1–25 of 130"`.
pub fn range_label(model: &PaginationModel, row_count: usize) -> String {
    let bounds = page_bounds(model, row_count);
    if bounds.is_empty() {
        return format!("0–0 of {row_count}");
    }
    format!("{}–{} of {}", bounds.start + 1, bounds.end, row_count)
}
