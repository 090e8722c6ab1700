//! Error types

use uuid::Uuid;

/// A query rejected before it reaches a source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Pages are 1-based.
    #[error("page must be at least 1, got {0}")]
    InvalidPage(u32),

    /// Page size outside the accepted range.
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit {
        /// Requested page size.
        limit: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// A task rejected before it is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskValidationError {
    #[error("title is required")]
    EmptyTitle,

    #[error("title must be at most {max} characters, got {len}")]
    TitleTooLong { len: usize, max: usize },
}

/// Errors returned by a [`TaskSource`](crate::TaskSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// No task with this id.
    #[error("task {0} not found")]
    NotFound(Uuid),

    /// The query failed validation.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// The task failed validation.
    #[error("invalid task: {0}")]
    InvalidTask(#[from] TaskValidationError),

    /// The source could not be reached or failed internally.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}
