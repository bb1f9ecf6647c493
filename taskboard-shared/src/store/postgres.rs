/// PostgreSQL-backed store
///
/// Thin adapter from the storage traits onto the model query functions.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CommentStore, HealthCheck, StoreError, StoreResult, TaskStore, UserStore};
use crate::db::pool;
use crate::models::{
    comment::{Comment, NewComment},
    page::{Page, PageRequest},
    task::{NewTask, Task, TaskChanges, TaskFilter, TaskOwner},
    user::{CreateUser, User},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique and foreign-key violations to [`StoreError::Conflict`]
fn map_constraint(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.ends_with("_key") || constraint.ends_with("_fkey") {
                return StoreError::Conflict(constraint.to_string());
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Task::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool).await?)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        Task::update(&self.pool, id, changes)
            .await
            .map_err(map_constraint)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn find_task_page(
        &self,
        owner: TaskOwner,
        filter: TaskFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Task>> {
        Ok(Task::find_page(&self.pool, owner, filter, page).await?)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment> {
        Comment::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn list_comments_by_task(&self, task_id: i64) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_task(&self.pool, task_id).await?)
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        Ok(Comment::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}
