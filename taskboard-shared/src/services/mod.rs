/// Domain services
///
/// Each service orchestrates validation, authorization and one store call
/// per operation. Callers pass the authenticated identity explicitly as an
/// [`AuthContext`](crate::auth::middleware::AuthContext).
///
/// # Services
///
/// - [`RegistrationService`]: new user accounts
/// - [`AuthenticationService`]: credential checks and token issuance
/// - [`TaskService`]: task CRUD, status changes and filtered listings
/// - [`CommentService`]: task comments
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::services::{Services, TokenSettings};
/// use taskboard_shared::store::memory::InMemoryStore;
///
/// let services = Services::new(
///     Arc::new(InMemoryStore::new()),
///     TokenSettings::new("secret-key-at-least-32-bytes-long!!"),
/// );
/// # let _ = services;
/// ```

pub mod authentication;
pub mod comments;
pub mod error;
pub mod registration;
pub mod tasks;

use chrono::Duration;
use std::sync::Arc;

pub use authentication::{AuthenticationService, IssuedToken};
pub use comments::CommentService;
pub use error::{ServiceError, ServiceResult};
pub use registration::RegistrationService;
pub use tasks::{TaskListing, TaskService};

use crate::auth::jwt::DEFAULT_EXPIRATION_MINUTES;
use crate::store::Storage;

/// Signing secret and lifetime for issued tokens
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub expiration: Duration,
}

impl TokenSettings {
    /// Settings with the default 60 minute lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration: Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
        }
    }

    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }
}

/// All services over one shared store
#[derive(Clone)]
pub struct Services {
    pub registration: RegistrationService,
    pub authentication: AuthenticationService,
    pub tasks: TaskService,
    pub comments: CommentService,
}

impl Services {
    pub fn new(store: Arc<dyn Storage>, tokens: TokenSettings) -> Self {
        Self {
            registration: RegistrationService::new(store.clone()),
            authentication: AuthenticationService::new(store.clone(), tokens),
            tasks: TaskService::new(store.clone()),
            comments: CommentService::new(store),
        }
    }
}
