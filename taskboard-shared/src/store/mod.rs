/// Storage ports for users, tasks and comments
///
/// Services depend on these traits rather than on a concrete database so the
/// same business rules run against PostgreSQL in production and against
/// [`memory::InMemoryStore`] in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx-backed, delegates to the model query functions
/// - [`memory::InMemoryStore`]: process-local maps behind a `tokio::sync::RwLock`
///
/// Every method performs a single read or a single write. There is no
/// explicit locking across calls, so two concurrent updates of the same
/// task resolve as last-write-wins.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{
    comment::{Comment, NewComment},
    page::{Page, PageRequest},
    task::{NewTask, Task, TaskChanges, TaskFilter, TaskOwner},
    user::{CreateUser, User},
};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the username is already taken.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by ID
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Finds a user by exact username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task and returns it with author/assignee resolved
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    /// Finds a task by ID
    async fn find_task_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Returns every task in id order
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Overwrites a task's mutable fields
    ///
    /// Returns `None` when the task does not exist.
    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>>;

    /// Deletes a task and its comments
    ///
    /// Returns false when the task does not exist.
    async fn delete_task(&self, id: i64) -> StoreResult<bool>;

    /// Returns one page of an author's or assignee's tasks, in id order
    async fn find_task_page(
        &self,
        owner: TaskOwner,
        filter: TaskFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Task>>;
}

/// Comment persistence
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Stores a new comment
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment>;

    /// Finds a comment by ID
    async fn find_comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>>;

    /// Lists a task's comments in insertion order
    async fn list_comments_by_task(&self, task_id: i64) -> StoreResult<Vec<Comment>>;

    /// Deletes a comment
    ///
    /// Returns false when the comment does not exist.
    async fn delete_comment(&self, id: i64) -> StoreResult<bool>;
}

/// Liveness probe for the backing storage
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Succeeds when the storage can serve queries
    async fn ping(&self) -> StoreResult<()>;
}

/// Everything the application needs from a storage backend
pub trait Storage: UserStore + TaskStore + CommentStore + HealthCheck + 'static {}

impl<T> Storage for T where T: UserStore + TaskStore + CommentStore + HealthCheck + 'static {}
