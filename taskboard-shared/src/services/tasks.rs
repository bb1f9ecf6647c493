/// Task operations
///
/// | Operation              | Not found      | Access rule                 |
/// |------------------------|----------------|-----------------------------|
/// | `create_task`          | assignee user  | any authenticated user      |
/// | `update_task`          | task           | author                      |
/// | `delete_task`          | task           | author                      |
/// | `change_status`        | task           | author who is also assignee |
/// | `get_task_by_id`       | task           | -                           |
/// | `get_tasks_by_author`  | author user    | -                           |
/// | `get_tasks_by_assignee`| assignee user  | -                           |
///
/// Updates are partial: only keys present in the request change, and the
/// merged result is validated before it is written.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{authorize, Relation},
    middleware::AuthContext,
};
use crate::models::{
    page::Page,
    task::{NewTask, Task, TaskChanges, TaskOwner, TaskQuery},
    user::User,
};
use crate::store::Storage;
use crate::validation::{
    validate_create_task, validate_listing_query, validate_status_change, validate_task_patch,
    CreateTaskRequest, ListTasksQuery, StatusChangeRequest, UpdateTaskRequest,
};

/// Outcome of an author or assignee listing
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TaskListing {
    /// A non-empty page
    Found(Page<Task>),

    /// Nothing on the requested page, with a filter-specific reason
    Empty { message: String },
}

/// Reason reported for an empty listing
pub fn empty_listing_message(owner: TaskOwner, query: TaskQuery) -> String {
    let who = match owner {
        TaskOwner::Author(_) => "author",
        TaskOwner::Assignee(_) => "assignee",
    };

    match query {
        TaskQuery::All => format!("No tasks found for this {who}"),
        TaskQuery::Status(_) => format!("No tasks found for this {who} with the given status"),
        TaskQuery::Priority(_) => format!("No tasks found for this {who} with the given priority"),
        TaskQuery::StatusAndPriority(..) => {
            format!("No tasks found for this {who} with the given status and priority")
        }
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Storage>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    async fn find_task(&self, id: i64) -> ServiceResult<Task> {
        self.store
            .find_task_by_id(id)
            .await?
            .ok_or(ServiceError::TaskNotFound(id))
    }

    async fn find_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.store.find_user_by_username(username).await?)
    }

    /// Creates a task authored by the caller
    ///
    /// # Errors
    ///
    /// - `Validation` for a missing or empty field or an unknown status or
    ///   priority
    /// - `UserNotFound` when the assignee username does not exist
    pub async fn create_task(&self, req: CreateTaskRequest, auth: &AuthContext) -> ServiceResult<Task> {
        let valid = validate_create_task(&req)?;

        let assignee_id = match &valid.assignee {
            Some(username) => Some(
                self.find_user_by_username(username)
                    .await?
                    .ok_or_else(|| ServiceError::UserNotFound(username.clone()))?
                    .id,
            ),
            None => None,
        };

        let task = self
            .store
            .create_task(NewTask {
                title: valid.title,
                description: valid.description,
                status: valid.status,
                priority: valid.priority,
                author_id: auth.user_id,
                assignee_id,
            })
            .await?;

        info!(task_id = task.id, author_id = auth.user_id, "Task created");
        Ok(task)
    }

    /// Applies the present keys of `req` to the caller's task
    ///
    /// An unknown assignee is reported as a validation failure alongside any
    /// other rejected field.
    pub async fn update_task(
        &self,
        id: i64,
        req: UpdateTaskRequest,
        auth: &AuthContext,
    ) -> ServiceResult<Task> {
        let task = self.find_task(id).await?;

        authorize(auth, &task, Relation::Author).map_err(|e| {
            debug!(task_id = id, user_id = auth.user_id, error = %e, "Update denied");
            ServiceError::AccessDenied("Cannot modify another user's task".to_string())
        })?;

        let (patch, mut violations) = validate_task_patch(&req);

        let mut changes = TaskChanges::from_task(&task);

        if let Some(username) = patch.assignee.as_deref() {
            if !violations.has("assignee") {
                match self.find_user_by_username(username).await? {
                    Some(user) => changes.assignee_id = Some(user.id),
                    None => violations.push("assignee", "Assignee does not exist"),
                }
            }
        }

        violations.into_result()?;

        if let Some(title) = patch.title {
            changes.title = title;
        }
        if let Some(description) = patch.description {
            changes.description = description;
        }
        if let Some(status) = patch.status {
            changes.status = status;
        }
        if let Some(priority) = patch.priority {
            changes.priority = priority;
        }

        let updated = self
            .store
            .update_task(id, changes)
            .await?
            .ok_or(ServiceError::TaskNotFound(id))?;

        info!(task_id = id, user_id = auth.user_id, "Task updated");
        Ok(updated)
    }

    pub async fn get_task_by_id(&self, id: i64) -> ServiceResult<Task> {
        self.find_task(id).await
    }

    /// Every task, unpaginated, in id order
    pub async fn get_all_tasks(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks().await?)
    }

    /// Deletes the caller's task along with its comments
    pub async fn delete_task(&self, id: i64, auth: &AuthContext) -> ServiceResult<()> {
        let task = self.find_task(id).await?;

        authorize(auth, &task, Relation::Author).map_err(|e| {
            debug!(task_id = id, user_id = auth.user_id, error = %e, "Delete denied");
            ServiceError::AccessDenied("Cannot delete another user's task".to_string())
        })?;

        if !self.store.delete_task(id).await? {
            return Err(ServiceError::TaskNotFound(id));
        }

        info!(task_id = id, user_id = auth.user_id, "Task deleted");
        Ok(())
    }

    /// Sets a task's status
    ///
    /// Only a caller who is both the author and the assignee passes the
    /// access check, so an unassigned task is always denied here.
    pub async fn change_status(
        &self,
        id: i64,
        req: StatusChangeRequest,
        auth: &AuthContext,
    ) -> ServiceResult<Task> {
        let task = self.find_task(id).await?;

        authorize(auth, &task, Relation::AuthorAndAssignee).map_err(|e| {
            debug!(task_id = id, user_id = auth.user_id, error = %e, "Status change denied");
            ServiceError::AccessDenied("Cannot change the status of another user's task".to_string())
        })?;

        let status = validate_status_change(&req)?;

        let mut changes = TaskChanges::from_task(&task);
        changes.status = status;

        let updated = self
            .store
            .update_task(id, changes)
            .await?
            .ok_or(ServiceError::TaskNotFound(id))?;

        info!(task_id = id, status = %status, "Task status changed");
        Ok(updated)
    }

    /// One page of tasks created by `author_id`
    pub async fn get_tasks_by_author(
        &self,
        author_id: i64,
        query: ListTasksQuery,
    ) -> ServiceResult<TaskListing> {
        self.list_for(TaskOwner::Author(author_id), query).await
    }

    /// One page of tasks assigned to `assignee_id`
    pub async fn get_tasks_by_assignee(
        &self,
        assignee_id: i64,
        query: ListTasksQuery,
    ) -> ServiceResult<TaskListing> {
        self.list_for(TaskOwner::Assignee(assignee_id), query).await
    }

    async fn list_for(&self, owner: TaskOwner, query: ListTasksQuery) -> ServiceResult<TaskListing> {
        let (filter, page) = validate_listing_query(&query)?;

        let user_id = owner.user_id();
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(ServiceError::UserNotFound(user_id.to_string()));
        }

        let result = self.store.find_task_page(owner, filter, page).await?;

        debug!(
            user_id,
            relation = owner.column(),
            query = ?filter.query(),
            page = page.page,
            size = page.size,
            total = result.total_elements,
            "Task listing"
        );

        if result.is_empty() {
            return Ok(TaskListing::Empty {
                message: empty_listing_message(owner, filter.query()),
            });
        }

        Ok(TaskListing::Found(result))
    }
}
