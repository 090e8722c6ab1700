//! Task list data layer.
//!
//! Task entities, filtered and paged queries, the data source seam the list
//! views read through, and the store that accumulates pages for incremental
//! loading.

pub mod error;
pub mod model;
pub mod query;
pub mod source;
pub mod store;

pub use error::{QueryError, SourceError, TaskValidationError};
pub use model::{NewTask, Task, TaskPriority, TaskStatus, TaskUpdate};
pub use query::{Page, Pagination, PaginationUpdate, TaskFilters, TaskQuery};
pub use source::{InMemoryTaskSource, TaskSource};
pub use store::TaskStore;
