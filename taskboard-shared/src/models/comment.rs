/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     content VARCHAR(140) NOT NULL,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::user::UserRef;

/// Longest comment accepted, in characters
pub const MAX_COMMENT_LENGTH: usize = 140;

/// Comment on a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    /// Server-assigned numeric ID
    pub id: i64,

    /// Comment text (1-140 characters)
    pub content: String,

    /// Task the comment is attached to
    pub task_id: i64,

    /// User who wrote the comment
    pub author: UserRef,

    /// When the comment was written
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    task_id: i64,
    author_id: i64,
    author_username: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            task_id: row.task_id,
            author: UserRef {
                id: row.author_id,
                username: row.author_username,
            },
            created_at: row.created_at,
        }
    }
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub task_id: i64,
    pub author_id: i64,
}

fn select_comments_from(source: &str) -> String {
    format!(
        r#"
        SELECT c.id, c.content, c.task_id, c.author_id,
               u.username AS author_username, c.created_at
        FROM {source} c
        JOIN users u ON u.id = c.author_id
        "#
    )
}

impl Comment {
    /// Creates a comment
    ///
    /// # Errors
    ///
    /// Returns an error if the task or author does not exist or the database
    /// connection fails
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO comments (content, task_id, author_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            {}
            "#,
            select_comments_from("inserted")
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(data.content)
            .bind(data.task_id)
            .bind(data.author_id)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("{} WHERE c.id = $1", select_comments_from("comments"));

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Comment::from))
    }

    /// Lists a task's comments in the order they were written
    pub async fn list_by_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "{} WHERE c.task_id = $1 ORDER BY c.id",
            select_comments_from("comments")
        );

        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(task_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Deletes a comment
    ///
    /// # Returns
    ///
    /// True if the comment was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
