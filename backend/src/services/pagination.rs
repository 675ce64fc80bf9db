//! Page number pagination.

use serde::{Deserialize, Serialize};

use super::error::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Slice `items` into the 1-based `page` of `page_size` entries.
    ///
    /// The first page always exists, even for an empty list.
    pub fn paginate(items: Vec<T>, page: Option<usize>, page_size: usize) -> ServiceResult<Self> {
        let page_size = page_size.max(1);
        let page = page.unwrap_or(1);
        let count = items.len();
        let pages = count.div_ceil(page_size).max(1);

        if page == 0 || page > pages {
            return Err(ServiceError::NotFound("Invalid page.".to_string()));
        }

        let results = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(Self {
            count,
            next: (page < pages).then_some(page + 1),
            previous: (page > 1).then_some(page - 1),
            results,
        })
    }

    /// Same page metadata around already rendered results.
    pub fn with_results<U>(self, results: Vec<U>) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
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

/// Requested page plus the configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, size: usize) -> Self {
        Self { page, size }
    }

    pub fn first(size: usize) -> Self {
        Self { page: None, size }
    }

    pub fn apply<T>(self, items: Vec<T>) -> ServiceResult<Page<T>> {
        Page::paginate(items, self.page, self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), Some(2), 10).unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.results, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn test_empty_list_has_first_page() {
        let page = Page::<i32>::paginate(Vec::new(), None, 10).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_out_of_range_page() {
        let err = Page::paginate(vec![1, 2, 3], Some(2), 10).unwrap_err();
        assert_eq!(err.to_string(), "Invalid page.");
        assert!(Page::paginate(vec![1], Some(0), 10).is_err());
    }
}
