/// Errors returned by the domain services
///
/// Each variant is a distinct outcome the HTTP layer maps to a status code.
/// No service recovers from these locally: any error aborts the operation
/// before its single store write.

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::store::StoreError;
use crate::validation::FieldViolation;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// One or more fields were rejected
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Username is already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Comment not found: {0}")]
    CommentNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Caller lacks the required relation to the resource
    #[error("{0}")]
    AccessDenied(String),

    /// Token was valid but no longer maps to a user
    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<Vec<FieldViolation>> for ServiceError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        ServiceError::Validation(violations)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
