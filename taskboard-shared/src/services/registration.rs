/// User registration

use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use crate::auth::password::hash_password;
use crate::models::user::{CreateUser, User};
use crate::store::{Storage, StoreError};
use crate::validation::{validate_registration, RegistrationRequest};

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn Storage>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Creates a user account
    ///
    /// # Errors
    ///
    /// - `Validation` when the username is not 3-30 characters or the
    ///   password is not 6-50 characters, or either is blank
    /// - `UsernameTaken` when the username already exists, including when a
    ///   concurrent registration wins the race to the unique constraint
    pub async fn register_new_user(&self, req: RegistrationRequest) -> ServiceResult<User> {
        validate_registration(&req)?;

        if self.store.find_user_by_username(&req.username).await?.is_some() {
            debug!(username = %req.username, "Registration rejected: username taken");
            return Err(ServiceError::UsernameTaken(req.username));
        }

        let password_hash = hash_password(&req.password)?;

        let user = self
            .store
            .create_user(CreateUser {
                username: req.username.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::UsernameTaken(req.username.clone()),
                other => other.into(),
            })?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }
}
