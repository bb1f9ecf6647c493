/// Database models for Taskboard
///
/// This module contains the persisted entities and the query types used to
/// read them back. Each model carries its own SQL as associated functions
/// taking a `&PgPool`; the [`crate::store`] layer wraps those behind traits.
///
/// # Models
///
/// - `user`: Registered accounts and the `UserRef` other records point at
/// - `task`: Tasks with status/priority enums, author and optional assignee
/// - `comment`: Short comments attached to a task
/// - `page`: Zero-indexed page requests and page results
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod page;
pub mod task;
pub mod user;
