/// User model and database operations
///
/// Users own the tasks they author and the comments they write. Tasks and
/// comments only keep a [`UserRef`] lookup to their author; a user's task and
/// comment lists are derived by querying, never stored on the user row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(30) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_username_key UNIQUE (username)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User model representing a registered account
///
/// Passwords are stored as Argon2id hashes and are never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Server-assigned numeric ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the lightweight reference tasks and comments hold
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Non-owning reference to a user
///
/// This is what a task's author/assignee and a comment's author resolve to
/// when read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User ID
    pub id: i64,

    /// Username at read time
    pub username: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Username (uniqueness is enforced by the database)
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The username already exists (unique constraint `users_username_key`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// Lookup is exact (case-sensitive), matching how usernames are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_ref() {
        let user = sample_user();
        let user_ref = user.to_ref();

        assert_eq!(user_ref.id, 7);
        assert_eq!(user_ref.username, "alice");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }
}
