/// Credential checks and token issuance
///
/// `authenticate` trades a username and password for a signed token.
/// `verify` is the reverse trip the bearer middleware takes on every
/// protected request: token to username to stored user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use super::TokenSettings;
use crate::auth::{
    jwt::{create_token, validate_token, Claims},
    middleware::AuthContext,
    password::verify_password,
};
use crate::store::Storage;
use crate::validation::LoginRequest;

/// A freshly signed token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn Storage>,
    tokens: TokenSettings,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn Storage>, tokens: TokenSettings) -> Self {
        Self { store, tokens }
    }

    /// Issues a token for valid credentials
    ///
    /// An unknown username and a wrong password fail identically with
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, req: LoginRequest) -> ServiceResult<IssuedToken> {
        let user = self
            .store
            .find_user_by_username(&req.username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            debug!(username = %req.username, "Authentication failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let claims = Claims::with_expiration(user.id, &user.username, self.tokens.expiration)?;
        let token = create_token(&claims, &self.tokens.secret)?;

        info!(user_id = user.id, "User authenticated");
        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_at: claims.expires_at(),
        })
    }

    /// Resolves a bearer token to the caller's identity
    ///
    /// # Errors
    ///
    /// - `Token` when the signature, issuer or expiry check fails
    /// - `Unauthenticated` when the user named by the token no longer
    ///   exists or its id does not match
    pub async fn verify(&self, token: &str) -> ServiceResult<AuthContext> {
        let claims = validate_token(token, &self.tokens.secret)?;

        let user = self
            .store
            .find_user_by_username(&claims.sub)
            .await?
            .filter(|user| user.id == claims.uid)
            .ok_or_else(|| ServiceError::Unauthenticated("Unknown user".to_string()))?;

        Ok(AuthContext::from(&user))
    }
}
