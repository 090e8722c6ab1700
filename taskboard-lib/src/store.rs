//! Task store
//!
//! Holds the loaded tasks, filters and pagination for a list view. Cloning a
//! `TaskStore` yields another handle to the same state, so a handle can be
//! moved into a spawned load while the view keeps reading snapshots.

use std::sync::{Arc, RwLock};

use log::{debug, warn};
use uuid::Uuid;

use crate::error::SourceError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::query::{Pagination, PaginationUpdate, TaskFilters, TaskQuery};
use crate::source::TaskSource;

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    selected: Option<Task>,
    loading: bool,
    error: Option<String>,
    filters: TaskFilters,
    pagination: Pagination,
    /// Bumped whenever the task list is replaced; in-flight appends from an
    /// older generation are dropped.
    generation: u64,
}

/// Shared task list state with async actions.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_lib::{InMemoryTaskSource, Task, TaskStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = InMemoryTaskSource::with_tasks((0..45).map(|i| Task::new(format!("Task {i}"))));
/// let store = TaskStore::new(Arc::new(source));
///
/// store.refresh().await.unwrap();
/// assert_eq!(store.len(), 20);
///
/// store.load_more_tasks().await.unwrap();
/// assert_eq!(store.len(), 40);
/// assert!(store.has_more());
/// # });
/// ```
#[derive(Clone)]
pub struct TaskStore {
    source: Arc<dyn TaskSource>,
    state: Arc<RwLock<StoreState>>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    pub fn new(source: Arc<dyn TaskSource>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> Option<R> {
        self.state.read().ok().map(|guard| f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Option<R> {
        self.state.write().ok().map(|mut guard| f(&mut guard))
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Loaded tasks, in load order.
    pub fn tasks(&self) -> Vec<Task> {
        self.read(|s| s.tasks.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.tasks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a request is in flight.
    pub fn loading(&self) -> bool {
        self.read(|s| s.loading).unwrap_or(false)
    }

    /// Message of the last failed request, cleared when a new one starts.
    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone()).unwrap_or_default()
    }

    pub fn filters(&self) -> TaskFilters {
        self.read(|s| s.filters.clone()).unwrap_or_default()
    }

    pub fn pagination(&self) -> Pagination {
        self.read(|s| s.pagination).unwrap_or_default()
    }

    /// Whether the source reported pages past the last loaded one.
    pub fn has_more(&self) -> bool {
        self.pagination().has_more()
    }

    pub fn selected(&self) -> Option<Task> {
        self.read(|s| s.selected.clone()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Synchronous actions
    // -------------------------------------------------------------------------

    /// Overlays the set fields of `filters` onto the current filters.
    pub fn set_filters(&self, filters: TaskFilters) {
        self.write(|s| s.filters.merge(filters));
    }

    /// Overlays the set fields of `update` onto the current pagination.
    pub fn set_pagination(&self, update: PaginationUpdate) {
        self.write(|s| update.apply(&mut s.pagination));
    }

    pub fn set_selected(&self, task: Option<Task>) {
        self.write(|s| s.selected = task);
    }

    /// Restores the initial state. Loads still in flight are discarded when
    /// they complete.
    pub fn reset(&self) {
        self.write(|s| {
            let generation = s.generation.wrapping_add(1);
            *s = StoreState {
                generation,
                ..Default::default()
            };
        });
    }

    // -------------------------------------------------------------------------
    // Async actions
    // -------------------------------------------------------------------------

    /// Replaces the loaded tasks with the page `query` returns.
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn fetch_tasks(&self, query: TaskQuery) -> Result<(), SourceError> {
        let generation = self
            .write(|s| {
                s.loading = true;
                s.error = None;
                s.generation = s.generation.wrapping_add(1);
                s.generation
            })
            .unwrap_or_default();

        let result = self.source.fetch_page(&query).await;

        self.write(|s| {
            if s.generation != generation {
                debug!("Dropping stale page {} response", query.page);
                return;
            }
            s.loading = false;
            match &result {
                Ok(page) => {
                    s.tasks = page.items.clone();
                    s.pagination = Pagination {
                        page: page.page,
                        limit: page.limit,
                        total: page.total,
                    };
                }
                Err(e) => {
                    warn!("Failed to fetch tasks: {}", e);
                    s.error = Some(e.to_string());
                }
            }
        });

        result.map(|_| ())
    }

    /// Loads the first page with the current filters and page size.
    ///
    /// # Errors
    ///
    /// See [`fetch_tasks`](Self::fetch_tasks).
    pub async fn refresh(&self) -> Result<(), SourceError> {
        let (filters, limit) = self
            .read(|s| (s.filters.clone(), s.pagination.limit))
            .unwrap_or_else(|| (TaskFilters::default(), Pagination::default().limit));
        self.fetch_tasks(TaskQuery::new(filters, 1, limit)).await
    }

    /// Appends the next page. Returns the number of tasks appended.
    ///
    /// Does nothing while another request is in flight or once the last page
    /// has been loaded.
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn load_more_tasks(&self) -> Result<usize, SourceError> {
        let claimed = self
            .write(|s| {
                if s.loading || s.pagination.page >= s.pagination.total_pages() {
                    return None;
                }
                s.loading = true;
                s.error = None;
                let query = TaskQuery::new(
                    s.filters.clone(),
                    s.pagination.page + 1,
                    s.pagination.limit,
                );
                Some((query, s.generation))
            })
            .flatten();

        let Some((query, generation)) = claimed else {
            debug!("Load more skipped");
            return Ok(0);
        };

        debug!("Loading page {}", query.page);
        let result = self.source.fetch_page(&query).await;

        let appended = self
            .write(|s| {
                if s.generation != generation {
                    debug!("Dropping stale page {} response", query.page);
                    return 0;
                }
                s.loading = false;
                match &result {
                    Ok(page) => {
                        s.tasks.extend(page.items.iter().cloned());
                        s.pagination = Pagination {
                            page: page.page,
                            limit: page.limit,
                            total: page.total,
                        };
                        page.items.len()
                    }
                    Err(e) => {
                        warn!("Failed to load more tasks: {}", e);
                        s.error = Some(e.to_string());
                        0
                    }
                }
            })
            .unwrap_or(0);

        result.map(|_| appended)
    }

    /// Loads a single task into [`selected`](Self::selected).
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn fetch_task_by_id(&self, id: Uuid) -> Result<Task, SourceError> {
        self.write(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.source.fetch_by_id(id).await;

        self.write(|s| {
            s.loading = false;
            match &result {
                Ok(task) => s.selected = Some(task.clone()),
                Err(e) => {
                    warn!("Failed to fetch task {}: {}", id, e);
                    s.error = Some(e.to_string());
                }
            }
        });

        result
    }

    /// Marks a write as started and returns the current generation.
    fn begin_write(&self) -> u64 {
        self.write(|s| {
            s.loading = true;
            s.error = None;
            s.generation
        })
        .unwrap_or_default()
    }

    /// Finishes a write started at `generation`: runs `apply` on success or
    /// records the error. Does nothing if the store was reset meanwhile.
    fn finish_write<T>(
        &self,
        generation: u64,
        action: &str,
        result: &Result<T, SourceError>,
        apply: impl FnOnce(&mut StoreState, &T),
    ) {
        self.write(|s| {
            if s.generation != generation {
                debug!("Dropping stale {} response", action);
                return;
            }
            s.loading = false;
            match result {
                Ok(value) => apply(s, value),
                Err(e) => {
                    warn!("Failed to {}: {}", action, e);
                    s.error = Some(e.to_string());
                }
            }
        });
    }

    /// Creates a task and puts it at the top of the loaded list.
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn create_task(&self, task: NewTask) -> Result<Task, SourceError> {
        let generation = self.begin_write();
        let result = self.source.create(task).await;
        self.finish_write(generation, "create task", &result, |s, task| {
            s.tasks.insert(0, task.clone());
        });
        result
    }

    /// Updates a task and replaces it in the loaded list and the selection.
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, SourceError> {
        let generation = self.begin_write();
        let result = self.source.update(id, update).await;
        self.finish_write(generation, "update task", &result, |s, task| {
            for loaded in s.tasks.iter_mut().filter(|t| t.id == id) {
                *loaded = task.clone();
            }
            if s.selected.as_ref().is_some_and(|t| t.id == id) {
                s.selected = Some(task.clone());
            }
        });
        result
    }

    /// Deletes a task and drops it from the loaded list and the selection.
    ///
    /// # Errors
    ///
    /// Returns the source error, which is also recorded in [`error`](Self::error).
    pub async fn delete_task(&self, id: Uuid) -> Result<(), SourceError> {
        let generation = self.begin_write();
        let result = self.source.remove(id).await;
        self.finish_write(generation, "delete task", &result, |s, _| {
            s.tasks.retain(|t| t.id != id);
            if s.selected.as_ref().is_some_and(|t| t.id == id) {
                s.selected = None;
            }
        });
        result
    }
}
