//! In-memory task source using DashMap

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::TaskSource;
use crate::error::SourceError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::query::{Page, TaskQuery};

/// A task source backed by a concurrent hash map.
///
/// Queries scan every task, so this is meant for demos and tests. Failures
/// can be queued with [`fail_next`](Self::fail_next) to exercise error paths.
///
/// # Example
///
/// ```
/// use taskboard_lib::{InMemoryTaskSource, Task};
///
/// let source = InMemoryTaskSource::new();
/// source.insert(Task::new("Write docs"));
/// assert_eq!(source.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTaskSource {
    tasks: DashMap<Uuid, Task>,
    failures: Mutex<VecDeque<SourceError>>,
    latency: Option<Duration>,
}

impl InMemoryTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source holding `tasks`.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let source = Self::new();
        for task in tasks {
            source.insert(task);
        }
        source
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Inserts or replaces a task.
    pub fn insert(&self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    /// Snapshot of a stored task.
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Makes the next call fail with `error`. Queued failures are consumed
    /// in order.
    pub async fn fail_next(&self, error: SourceError) {
        self.failures.lock().await.push_back(error);
    }

    async fn before_call(&self) -> Result<(), SourceError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn fetch_page(&self, query: &TaskQuery) -> Result<Page<Task>, SourceError> {
        query.validate()?;
        self.before_call().await?;

        let mut matching: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| query.filters.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let items: Vec<Task> = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit as usize)
            .collect();

        debug!(
            "Fetched page {} ({} of {} tasks, limit {})",
            query.page,
            items.len(),
            total,
            query.limit
        );

        Ok(Page {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Task, SourceError> {
        self.before_call().await?;
        self.tasks
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(SourceError::NotFound(id))
    }

    async fn create(&self, task: NewTask) -> Result<Task, SourceError> {
        task.validate()?;
        self.before_call().await?;

        let task = task.into_task();
        debug!("Created task {}", task.id);
        self.insert(task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, update: TaskUpdate) -> Result<Task, SourceError> {
        update.validate()?;
        self.before_call().await?;

        let mut entry = self.tasks.get_mut(&id).ok_or(SourceError::NotFound(id))?;
        update.apply(entry.value_mut());
        debug!("Updated task {}", id);
        Ok(entry.value().clone())
    }

    async fn remove(&self, id: Uuid) -> Result<(), SourceError> {
        self.before_call().await?;
        self.tasks
            .remove(&id)
            .map(|_| debug!("Removed task {}", id))
            .ok_or(SourceError::NotFound(id))
    }
}
