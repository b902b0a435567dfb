//! Page-number pagination for list endpoints.
//!
//! Responses follow the `{count, next, previous, results}` envelope; `next` and `previous`
//! are page numbers rather than URLs so clients can build their own links.

use serde::Serialize;

use crate::error::{MetronError, MetronResult};

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request from the optional `?page=` parameter. Pages start at 1.
    pub fn new(page: Option<u32>, page_size: u32) -> MetronResult<Self> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(MetronError::validation("Page numbers start at 1"));
        }
        Ok(Self {
            page,
            page_size: page_size.max(1),
        })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Number of pages needed for `count` rows (an empty result still has one page).
    pub fn page_count(&self, count: i64) -> u32 {
        let size = i64::from(self.page_size);
        let pages = (count.max(0) + size - 1) / size;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    /// Reject pages past the end, like an invalid page link.
    pub fn ensure_in_range(&self, count: i64) -> MetronResult<()> {
        if self.page > self.page_count(count) {
            return Err(MetronError::not_found("Page"));
        }
        Ok(())
    }
}

/// Paginated response envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: &PageRequest) -> Self {
        let last = request.page_count(count);
        Self {
            count,
            next: (request.page < last).then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_page_number() {
        let req = PageRequest::new(Some(3), 28).unwrap();
        assert_eq!(req.limit(), 28);
        assert_eq!(req.offset(), 56);
        assert_eq!(PageRequest::new(None, 28).unwrap().offset(), 0);
    }

    #[test]
    fn page_zero_is_invalid() {
        assert!(PageRequest::new(Some(0), 10).is_err());
    }

    #[test]
    fn envelope_links() {
        let req = PageRequest::new(Some(2), 28).unwrap();
        let page = Page::new(vec![1, 2, 3, 4, 5, 6, 7], 35, &req);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(1));

        let first = PageRequest::new(None, 28).unwrap();
        let page = Page::new(vec![0; 28], 35, &first);
        assert_eq!(page.next, Some(2));
        assert_eq!(page.previous, None);
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        let req = PageRequest::new(Some(3), 28).unwrap();
        assert!(req.ensure_in_range(35).is_err());
        assert!(req.ensure_in_range(57).is_ok());
        // The first page of an empty list is still valid.
        assert!(PageRequest::new(None, 28).unwrap().ensure_in_range(0).is_ok());
    }
}
