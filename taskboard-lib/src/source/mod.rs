//! Task data sources
//!
//! A `TaskSource` answers paged, filtered listing queries and single-task
//! lookups, and writes created, updated and removed tasks. The store reads through this seam so list views can run against
//! a remote API or the in-memory source used for demos and tests.

mod memory;

pub use memory::*;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SourceError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::query::{Page, TaskQuery};

/// Trait for task sources.
///
/// Implementations must:
/// - Reject queries that fail [`TaskQuery::validate`]
/// - Return tasks ordered newest first by `created_at`
/// - Report the total number of matching tasks in every page
/// - Validate new tasks and updates before writing them
/// - Return [`SourceError::NotFound`] when updating or removing a missing id
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetches one page of tasks matching `query`.
    async fn fetch_page(&self, query: &TaskQuery) -> Result<Page<Task>, SourceError>;

    /// Fetches a single task by id.
    async fn fetch_by_id(&self, id: Uuid) -> Result<Task, SourceError>;

    /// Stores a new task and returns it with its assigned id.
    async fn create(&self, task: NewTask) -> Result<Task, SourceError>;

    /// Applies `update` to an existing task and returns the result.
    async fn update(&self, id: Uuid, update: TaskUpdate) -> Result<Task, SourceError>;

    /// Deletes a task.
    async fn remove(&self, id: Uuid) -> Result<(), SourceError>;
}
