/// Task comments
///
/// Any authenticated user may comment on an existing task. Only a
/// comment's author may delete it.

use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{authorize, Relation},
    middleware::AuthContext,
};
use crate::models::comment::{Comment, NewComment};
use crate::store::{Storage, StoreError};
use crate::validation::{validate_comment, CommentRequest};

/// Constraint violated when the task disappears before the insert lands
const TASK_FOREIGN_KEY: &str = "comments_task_id_fkey";

fn creation_error(task_id: i64, err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(constraint) if constraint == TASK_FOREIGN_KEY => {
            ServiceError::TaskNotFound(task_id)
        }
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Storage>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    async fn ensure_task_exists(&self, task_id: i64) -> ServiceResult<()> {
        match self.store.find_task_by_id(task_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::TaskNotFound(task_id)),
        }
    }

    /// Adds a comment by the caller to a task
    ///
    /// # Errors
    ///
    /// - `TaskNotFound` when the task does not exist
    /// - `Validation` when the content is missing, blank or longer than 140
    ///   characters
    pub async fn add_comment(
        &self,
        task_id: i64,
        req: CommentRequest,
        auth: &AuthContext,
    ) -> ServiceResult<Comment> {
        self.ensure_task_exists(task_id).await?;

        let content = validate_comment(&req)?;

        let comment = self
            .store
            .create_comment(NewComment {
                content,
                task_id,
                author_id: auth.user_id,
            })
            .await
            .map_err(|e| creation_error(task_id, e))?;

        info!(comment_id = comment.id, task_id, author_id = auth.user_id, "Comment added");
        Ok(comment)
    }

    /// All comments on a task, oldest first
    pub async fn get_comments_by_task(&self, task_id: i64) -> ServiceResult<Vec<Comment>> {
        self.ensure_task_exists(task_id).await?;
        Ok(self.store.list_comments_by_task(task_id).await?)
    }

    /// Deletes one of the caller's comments
    pub async fn delete_comment(&self, comment_id: i64, auth: &AuthContext) -> ServiceResult<()> {
        let comment = self
            .store
            .find_comment_by_id(comment_id)
            .await?
            .ok_or(ServiceError::CommentNotFound(comment_id))?;

        authorize(auth, &comment, Relation::Author).map_err(|e| {
            debug!(comment_id, user_id = auth.user_id, error = %e, "Comment delete denied");
            ServiceError::AccessDenied("Cannot delete another user's comment".to_string())
        })?;

        if !self.store.delete_comment(comment_id).await? {
            return Err(ServiceError::CommentNotFound(comment_id));
        }

        info!(comment_id, user_id = auth.user_id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::{memory::InMemoryStore, CommentStore, UserStore};

    #[tokio::test]
    async fn test_insert_against_vanished_task_is_not_found() {
        let store = InMemoryStore::new();
        let author = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();

        let err = store
            .create_comment(NewComment {
                content: "late".to_string(),
                task_id: 7,
                author_id: author.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(creation_error(7, err), ServiceError::TaskNotFound(7)));
    }

    #[test]
    fn test_other_conflicts_stay_store_errors() {
        let err = creation_error(7, StoreError::Conflict("comments_author_id_fkey".to_string()));
        assert!(matches!(err, ServiceError::Store(StoreError::Conflict(_))));
    }
}
