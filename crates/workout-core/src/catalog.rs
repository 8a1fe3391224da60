//! Exercise catalog queries and pagination.

use crate::exercise::ExerciseRef;
use serde::{Deserialize, Serialize};

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Catalog listing filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseFilter {
    /// Case-insensitive name search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
}

impl ExerciseFilter {
    /// First page with the default limit.
    pub fn new() -> Self {
        Self {
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set the search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() { None } else { Some(search) };
        self
    }

    /// Set the page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Whether an exercise matches the search text.
    pub fn matches(&self, exercise: &ExerciseRef) -> bool {
        match self.search.as_deref() {
            Some(text) => exercise
                .name
                .to_lowercase()
                .contains(&text.trim().to_lowercase()),
            None => true,
        }
    }

    /// Filter and paginate a full catalog.
    pub fn apply(&self, catalog: &[ExerciseRef]) -> ExercisePage {
        let limit = self.limit.max(1);
        let page = self.page.max(1);
        let matching: Vec<&ExerciseRef> = catalog.iter().filter(|e| self.matches(e)).collect();

        let pagination = Pagination::new(page, limit, matching.len() as u64);
        let start = (page as usize - 1) * limit as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();

        ExercisePage { items, pagination }
    }
}

impl Default for ExerciseFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages.
    pub pages: u32,
}

impl Pagination {
    /// Create pagination info.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1) as u64;
        let pages = if total == 0 {
            1
        } else {
            total.div_ceil(limit) as u32
        };
        Self { page, total, pages }
    }

    /// Whether there's a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExercisePage {
    /// Exercises on this page.
    pub items: Vec<ExerciseRef>,
    /// Pagination info.
    pub pagination: Pagination,
}
