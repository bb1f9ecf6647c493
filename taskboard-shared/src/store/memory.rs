/// In-memory store for tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CommentStore, HealthCheck, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{
    comment::{Comment, NewComment},
    page::{Page, PageRequest},
    task::{NewTask, Task, TaskChanges, TaskFilter, TaskOwner, TaskPriority, TaskStatus},
    user::{CreateUser, User, UserRef},
};

/// Thread-safe in-memory store implementing every storage trait
///
/// Ids are assigned from per-table counters starting at 1, and `BTreeMap`
/// keeps every listing in id order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    last_user_id: i64,
    last_task_id: i64,
    last_comment_id: i64,
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, TaskRecord>,
    comments: BTreeMap<i64, CommentRecord>,
}

#[derive(Debug, Clone)]
struct TaskRecord {
    id: i64,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    author_id: i64,
    assignee_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    content: String,
    task_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn user_ref(&self, id: i64) -> Option<UserRef> {
        self.users.get(&id).map(User::to_ref)
    }

    /// Joins a record with its users, mirroring the SQL join
    fn resolve_task(&self, record: &TaskRecord) -> Option<Task> {
        let author = self.user_ref(record.author_id)?;
        let assignee = record.assignee_id.and_then(|id| self.user_ref(id));

        Some(Task {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status,
            priority: record.priority,
            author,
            assignee,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn resolve_comment(&self, record: &CommentRecord) -> Option<Comment> {
        Some(Comment {
            id: record.id,
            content: record.content.clone(),
            task_id: record.task_id,
            author: self.user_ref(record.author_id)?,
            created_at: record.created_at,
        })
    }

    fn check_user_exists(&self, id: i64, relation: &str) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!("{relation}_fkey")))
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("users_username_key".to_string()));
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            username: data.username,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        state.check_user_exists(data.author_id, "tasks_author_id")?;
        if let Some(assignee_id) = data.assignee_id {
            state.check_user_exists(assignee_id, "tasks_assignee_id")?;
        }

        state.last_task_id += 1;
        let now = Utc::now();
        let record = TaskRecord {
            id: state.last_task_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            author_id: data.author_id,
            assignee_id: data.assignee_id,
            created_at: now,
            updated_at: now,
        };
        let task = state.resolve_task(&record);
        state.tasks.insert(record.id, record);

        task.ok_or_else(|| StoreError::Conflict("tasks_author_id_fkey".to_string()))
    }

    async fn find_task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).and_then(|r| state.resolve_task(r)))
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter_map(|r| state.resolve_task(r))
            .collect())
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        if let Some(assignee_id) = changes.assignee_id {
            state.check_user_exists(assignee_id, "tasks_assignee_id")?;
        }

        let Some(record) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        record.title = changes.title;
        record.description = changes.description;
        record.status = changes.status;
        record.priority = changes.priority;
        record.assignee_id = changes.assignee_id;
        record.updated_at = Utc::now();

        let record = record.clone();
        Ok(state.resolve_task(&record))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if state.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.task_id != id);

        Ok(true)
    }

    async fn find_task_page(
        &self,
        owner: TaskOwner,
        filter: TaskFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Task>> {
        let state = self.state.read().await;

        let matching: Vec<Task> = state
            .tasks
            .values()
            .filter_map(|r| state.resolve_task(r))
            .filter(|task| owner.matches(task) && filter.matches(task))
            .collect();

        let total = matching.len() as i64;
        let content = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(Page::new(content, page, total))
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment> {
        let mut state = self.state.write().await;

        state.check_user_exists(data.author_id, "comments_author_id")?;
        if !state.tasks.contains_key(&data.task_id) {
            return Err(StoreError::Conflict("comments_task_id_fkey".to_string()));
        }

        state.last_comment_id += 1;
        let record = CommentRecord {
            id: state.last_comment_id,
            content: data.content,
            task_id: data.task_id,
            author_id: data.author_id,
            created_at: Utc::now(),
        };
        let comment = state.resolve_comment(&record);
        state.comments.insert(record.id, record);

        comment.ok_or_else(|| StoreError::Conflict("comments_author_id_fkey".to_string()))
    }

    async fn find_comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.get(&id).and_then(|r| state.resolve_comment(r)))
    }

    async fn list_comments_by_task(&self, task_id: i64) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .filter_map(|r| state.resolve_comment(r))
            .collect())
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
