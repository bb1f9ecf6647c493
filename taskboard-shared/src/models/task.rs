/// Task model and database operations
///
/// A task is authored by exactly one user and may be assigned to another.
/// Both references are resolved to [`UserRef`]s on every read so callers
/// never see a dangling id.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'COMPLETED');
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL,
///     priority task_priority NOT NULL,
///     author_id BIGINT NOT NULL REFERENCES users(id),
///     assignee_id BIGINT REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{NewTask, Task, TaskPriority, TaskStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, author_id: i64) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     title: "Write release notes".to_string(),
///     description: "Cover the new listing filters".to_string(),
///     status: TaskStatus::Pending,
///     priority: TaskPriority::High,
///     author_id,
///     assignee_id: None,
/// }).await?;
///
/// assert_eq!(task.author.id, author_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

use super::page::{Page, PageRequest};
use super::user::UserRef;

/// Task progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// All statuses in declaration order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Parses a status name, ignoring case and surrounding whitespace
    ///
    /// Returns `None` for anything that is not a known status.
    ///
    /// ```
    /// use taskboard_shared::models::task::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse("CoMpLeTeD"), Some(TaskStatus::Completed));
    /// assert_eq!(TaskStatus::parse("done"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// All priorities in declaration order
    pub const ALL: [TaskPriority; 3] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }

    /// Parses a priority name, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model with author and assignee resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Server-assigned numeric ID
    pub id: i64,

    /// Short title (never empty)
    pub title: String,

    /// Free-form description (never empty)
    pub description: String,

    /// Current progress
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// User who created the task; fixed for the task's lifetime
    pub author: UserRef,

    /// User the task is delegated to, if any
    pub assignee: Option<UserRef>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last changed
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape produced by the joined task queries
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    author_id: i64,
    author_username: String,
    assignee_id: Option<i64>,
    assignee_username: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let assignee = match (row.assignee_id, row.assignee_username) {
            (Some(id), Some(username)) => Some(UserRef { id, username }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            author: UserRef {
                id: row.author_id,
                username: row.author_username,
            },
            assignee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub author_id: i64,
    pub assignee_id: Option<i64>,
}

/// Replacement values for every mutable task column
///
/// Services merge a partial patch onto the stored task and hand the full
/// result here, so the store never needs to know which keys were sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
}

impl TaskChanges {
    /// Starts from the task's current values
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee.as_ref().map(|assignee| assignee.id),
        }
    }
}

/// Which relation a task listing is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwner {
    /// Tasks created by the user
    Author(i64),

    /// Tasks assigned to the user
    Assignee(i64),
}

impl TaskOwner {
    /// The user the listing is for
    pub fn user_id(&self) -> i64 {
        match self {
            TaskOwner::Author(id) | TaskOwner::Assignee(id) => *id,
        }
    }

    /// Column holding the relation
    pub fn column(&self) -> &'static str {
        match self {
            TaskOwner::Author(_) => "author_id",
            TaskOwner::Assignee(_) => "assignee_id",
        }
    }

    /// True when `task` belongs in this owner's listing
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskOwner::Author(id) => task.author.id == *id,
            TaskOwner::Assignee(id) => task.assignee.as_ref().map(|a| a.id) == Some(*id),
        }
    }
}

/// Optional status/priority filter for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Classifies the filter into one of the four query variants
    pub fn query(&self) -> TaskQuery {
        match (self.status, self.priority) {
            (Some(status), Some(priority)) => TaskQuery::StatusAndPriority(status, priority),
            (Some(status), None) => TaskQuery::Status(status),
            (None, Some(priority)) => TaskQuery::Priority(priority),
            (None, None) => TaskQuery::All,
        }
    }

    /// True when `task` passes the filter
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

/// The four listing query shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskQuery {
    All,
    Status(TaskStatus),
    Priority(TaskPriority),
    StatusAndPriority(TaskStatus, TaskPriority),
}

/// Builds the joined task SELECT over `source` (aliased `t`)
fn select_tasks_from(source: &str) -> String {
    format!(
        r#"
        SELECT t.id, t.title, t.description, t.status, t.priority,
               t.author_id, a.username AS author_username,
               t.assignee_id, s.username AS assignee_username,
               t.created_at, t.updated_at
        FROM {source} t
        JOIN users a ON a.id = t.author_id
        LEFT JOIN users s ON s.id = t.assignee_id
        "#
    )
}

impl Task {
    /// Creates a new task in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the author or assignee id violates its foreign key
    /// or the database connection fails
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO tasks (title, description, status, priority, author_id, assignee_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            {}
            "#,
            select_tasks_from("inserted")
        );

        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.author_id)
            .bind(data.assignee_id)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("{} WHERE t.id = $1", select_tasks_from("tasks"));

        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Task::from))
    }

    /// Lists every task in id order
    ///
    /// This is intentionally unpaginated.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!("{} ORDER BY t.id", select_tasks_from("tasks"));

        let rows = sqlx::query_as::<_, TaskRow>(&sql).fetch_all(pool).await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Overwrites the mutable columns of a task
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task has this id
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE tasks
                SET title = $2, description = $3, status = $4, priority = $5,
                    assignee_id = $6, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {}
            "#,
            select_tasks_from("updated")
        );

        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.status)
            .bind(changes.priority)
            .bind(changes.assignee_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Task::from))
    }

    /// Deletes a task (its comments cascade)
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches one page of an author's or assignee's tasks
    ///
    /// Runs one of four query shapes depending on which filters are set.
    /// Results are ordered by id.
    pub async fn find_page(
        pool: &PgPool,
        owner: TaskOwner,
        filter: TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Self>, sqlx::Error> {
        let column = owner.column();
        let (condition, next_param) = match filter.query() {
            TaskQuery::All => (format!("t.{column} = $1"), 2),
            TaskQuery::Status(_) => (format!("t.{column} = $1 AND t.status = $2"), 3),
            TaskQuery::Priority(_) => (format!("t.{column} = $1 AND t.priority = $2"), 3),
            TaskQuery::StatusAndPriority(..) => (
                format!("t.{column} = $1 AND t.status = $2 AND t.priority = $3"),
                4,
            ),
        };

        let count_sql = format!("SELECT COUNT(*) FROM tasks t WHERE {condition}");
        let page_sql = format!(
            "{} WHERE {condition} ORDER BY t.id LIMIT ${} OFFSET ${}",
            select_tasks_from("tasks"),
            next_param,
            next_param + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(owner.user_id());
        let mut page_query = sqlx::query_as::<_, TaskRow>(&page_sql).bind(owner.user_id());

        if let Some(status) = filter.status {
            count_query = count_query.bind(status);
            page_query = page_query.bind(status);
        }
        if let Some(priority) = filter.priority {
            count_query = count_query.bind(priority);
            page_query = page_query.bind(priority);
        }

        let total = count_query.fetch_one(pool).await?;
        let rows = page_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Task::from).collect(),
            page,
            total,
        ))
    }
}
