//! Pagination controller.
//!
//! The hosting page owns the page state and supplies it on every render. The
//! controller only turns navigation requests into [`PageRequest`]s, clamping
//! out-of-range indices instead of failing.

use log::debug;
use serde::Deserialize;

/// Page position and counts, as reported by the hosting page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
    pub total_elements: usize,
    /// Page count, when the host knows it. Derived from the element count
    /// otherwise.
    pub total_pages: Option<usize>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 30,
            total_elements: 0,
            total_pages: None,
        }
    }
}

impl PageState {
    pub fn new(page_index: usize, page_size: usize, total_elements: usize) -> Self {
        Self {
            page_index,
            page_size,
            total_elements,
            total_pages: None,
        }
    }

    pub fn with_total_pages(mut self, total_pages: usize) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// Page count, or `None` when it cannot be known.
    pub fn total_pages(&self) -> Option<usize> {
        self.total_pages.or_else(|| {
            (self.page_size > 0).then(|| self.total_elements.div_ceil(self.page_size))
        })
    }

    /// One-based sequence number of a row on the current page.
    pub fn sequence_number(&self, row_index: usize) -> usize {
        self.page_size * self.page_index + row_index + 1
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        match self.total_pages() {
            Some(total) => self.page_index + 1 < total,
            None => true,
        }
    }

    /// Clamp an index into `0..total_pages`.
    fn clamp(&self, page_index: usize) -> usize {
        match self.total_pages() {
            Some(0) => 0,
            Some(total) => page_index.min(total - 1),
            None => page_index,
        }
    }
}

/// Navigation request for the hosting page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
}

/// Translates navigation into page requests against the current state.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a> {
    state: &'a PageState,
}

impl<'a> Paginator<'a> {
    pub fn new(state: &'a PageState) -> Self {
        Self { state }
    }

    /// Request a page by index.
    ///
    /// Out-of-range indices are clamped. Returns `None` when the clamped index
    /// is the current page.
    pub fn request_page_change(&self, page_index: usize) -> Option<PageRequest> {
        let clamped = self.state.clamp(page_index);
        if clamped == self.state.page_index {
            return None;
        }
        debug!("page change {} -> {}", self.state.page_index, clamped);
        Some(PageRequest {
            page_index: clamped,
            page_size: self.state.page_size,
        })
    }

    pub fn next_page(&self) -> Option<PageRequest> {
        self.request_page_change(self.state.page_index.saturating_add(1))
    }

    pub fn previous_page(&self) -> Option<PageRequest> {
        self.request_page_change(self.state.page_index.saturating_sub(1))
    }

    pub fn first_page(&self) -> Option<PageRequest> {
        self.request_page_change(0)
    }

    /// Request the last page. Needs a known page count.
    pub fn last_page(&self) -> Option<PageRequest> {
        let total = self.state.total_pages()?;
        self.request_page_change(total.saturating_sub(1))
    }

    /// Change the page size. Always returns to the first page.
    pub fn set_page_size(&self, page_size: usize) -> Option<PageRequest> {
        let page_size = page_size.max(1);
        if page_size == self.state.page_size && self.state.page_index == 0 {
            return None;
        }
        debug!("page size {} -> {}", self.state.page_size, page_size);
        Some(PageRequest {
            page_index: 0,
            page_size,
        })
    }
}
