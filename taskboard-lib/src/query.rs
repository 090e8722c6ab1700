//! Listing filters, pagination and page envelopes.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::model::{Task, TaskPriority, TaskStatus};

/// Default page size for a bare [`TaskQuery`].
pub const DEFAULT_QUERY_LIMIT: u32 = 10;
/// Largest page size a source accepts.
pub const MAX_QUERY_LIMIT: u32 = 100;
/// Default page size used by the store.
pub const DEFAULT_STORE_LIMIT: u32 = 20;

/// Optional listing filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring of title or description, matched as given.
    /// An empty string matches every task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TaskFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Overlays the fields set in `other` onto `self`.
    pub fn merge(&mut self, other: TaskFilters) {
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.priority.is_some() {
            self.priority = other.priority;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
    }

    /// Whether `task` passes every set filter.
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| status != task.status) {
            return false;
        }
        if self.priority.is_some() && self.priority != task.priority {
            return false;
        }
        match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(flatten)]
    pub filters: TaskFilters,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_QUERY_LIMIT
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            filters: TaskFilters::default(),
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl TaskQuery {
    pub fn new(filters: TaskFilters, page: u32, limit: u32) -> Self {
        Self {
            filters,
            page,
            limit,
        }
    }

    /// Checks page and limit bounds.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidPage`] for page 0, [`QueryError::InvalidLimit`]
    /// for a limit outside `1..=100`.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page == 0 {
            return Err(QueryError::InvalidPage(self.page));
        }
        if self.limit == 0 || self.limit > MAX_QUERY_LIMIT {
            return Err(QueryError::InvalidLimit {
                limit: self.limit,
                max: MAX_QUERY_LIMIT,
            });
        }
        Ok(())
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "tasks")]
    pub items: Vec<T>,
    /// Matching rows across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit)) as u32
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Pagination state tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_STORE_LIMIT,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit)) as u32
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Partial pagination update; unset fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub total: Option<u64>,
}

impl PaginationUpdate {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, pagination: &mut Pagination) {
        if let Some(page) = self.page {
            pagination.page = page;
        }
        if let Some(limit) = self.limit {
            pagination.limit = limit;
        }
        if let Some(total) = self.total {
            pagination.total = total;
        }
    }
}
