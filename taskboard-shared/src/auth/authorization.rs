/// Ownership checks for tasks and comments
///
/// Every per-operation access rule goes through the single predicate
/// [`authorize`], which takes the caller, the resource and the relation the
/// caller must hold to it.
///
/// # Rules
///
/// | Operation             | Resource | Relation                          |
/// |-----------------------|----------|-----------------------------------|
/// | update / delete task  | Task     | [`Relation::Author`]              |
/// | change task status    | Task     | [`Relation::AuthorAndAssignee`]   |
/// | delete comment        | Comment  | [`Relation::Author`]              |
///
/// The status-change rule requires the caller to be both author and
/// assignee, so a task without an assignee can never have its status
/// changed through that operation. Use `update_task` instead.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{authorize, OwnedResource, Relation};
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// struct Note { author_id: i64 }
///
/// impl OwnedResource for Note {
///     fn author_id(&self) -> i64 { self.author_id }
/// }
///
/// let alice = AuthContext::new(1, "alice");
/// assert!(authorize(&alice, &Note { author_id: 1 }, Relation::Author).is_ok());
/// assert!(authorize(&alice, &Note { author_id: 2 }, Relation::Author).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::{comment::Comment, task::Task};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not the author
    #[error("Only the author may perform this action")]
    NotAuthor,

    /// Caller is not both author and assignee
    #[error("Only a user who is both author and assignee may perform this action")]
    NotAuthorAndAssignee,
}

/// The relation a caller must hold to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Caller created the resource
    Author,

    /// Caller created the resource and is also its assignee
    AuthorAndAssignee,
}

/// A resource with an author and, optionally, an assignee
pub trait OwnedResource {
    fn author_id(&self) -> i64;

    fn assignee_id(&self) -> Option<i64> {
        None
    }
}

impl OwnedResource for Task {
    fn author_id(&self) -> i64 {
        self.author.id
    }

    fn assignee_id(&self) -> Option<i64> {
        self.assignee.as_ref().map(|assignee| assignee.id)
    }
}

impl OwnedResource for Comment {
    fn author_id(&self) -> i64 {
        self.author.id
    }
}

/// Checks that `subject` holds `relation` to `resource`
pub fn authorize(
    subject: &AuthContext,
    resource: &impl OwnedResource,
    relation: Relation,
) -> Result<(), AuthzError> {
    let is_author = resource.author_id() == subject.user_id;
    let is_assignee = resource.assignee_id() == Some(subject.user_id);

    match relation {
        Relation::Author if is_author => Ok(()),
        Relation::Author => Err(AuthzError::NotAuthor),
        Relation::AuthorAndAssignee if is_author && is_assignee => Ok(()),
        Relation::AuthorAndAssignee => Err(AuthzError::NotAuthorAndAssignee),
    }
}
