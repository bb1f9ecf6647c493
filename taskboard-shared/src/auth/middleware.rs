/// Request identity for authenticated routes
///
/// The bearer middleware in the API crate reads the `Authorization` header
/// with [`bearer_token`], resolves the token to a stored user, and inserts an
/// [`AuthContext`] into the request extensions. Handlers pass that context
/// explicitly into every service call.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} ({})", auth.username, auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

impl AuthContext {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

impl From<&User> for AuthContext {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.username.clone())
    }
}

/// Error type for credential extraction
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),
}

/// Extracts the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty Bearer token".to_string()));
    }

    Ok(token)
}
