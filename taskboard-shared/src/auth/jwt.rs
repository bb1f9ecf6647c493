/// JWT token generation and validation module
///
/// Successful authentication issues an HS256-signed token whose subject is
/// the username. The bearer middleware validates it on every protected
/// request and maps it back to the same user.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable, 60 minutes by default
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
///
/// let claims = Claims::new(1, "alice");
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, "alice");
/// assert_eq!(validated.uid, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim
pub const ISSUER: &str = "taskboard";

/// Token lifetime when none is configured
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (username)
/// - `uid`: Numeric user ID
/// - `iss`: Issuer (always "taskboard")
/// - `iat`, `nbf`, `exp`: Issued at, not before, expiration (Unix timestamps)
/// - `jti`: Unique token ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// User ID
    pub uid: i64,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token ID
    pub jti: Uuid,
}

impl Claims {
    /// Creates claims with the default 60 minute lifetime
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self::issued_at(user_id, username, now, now + Duration::minutes(DEFAULT_EXPIRATION_MINUTES))
    }

    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration produces an already expired token, which tests use.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` when the expiry falls outside the
    /// representable date range
    pub fn with_expiration(
        user_id: i64,
        username: impl Into<String>,
        expires_in: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = now.checked_add_signed(expires_in).ok_or_else(|| {
            JwtError::CreateError(format!("Token lifetime out of range: {expires_in}"))
        })?;

        Ok(Self::issued_at(user_id, username, now, expiration))
    }

    fn issued_at(
        user_id: i64,
        username: impl Into<String>,
        now: DateTime<Utc>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: username.into(),
            uid: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, not-before time and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` when `exp` has passed
/// - `JwtError::InvalidIssuer` when `iss` is not "taskboard"
/// - `JwtError::ValidationError` for a bad signature or malformed token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, "alice");

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, DEFAULT_EXPIRATION_MINUTES * 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_each_token_gets_unique_id() {
        assert_ne!(Claims::new(1, "alice").jti, Claims::new(1, "alice").jti);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(1, "alice");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new(1, "alice"), SECRET).unwrap();

        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_tampered_token() {
        let token = create_token(&Claims::new(1, "alice"), SECRET).unwrap();
        let forged = create_token(&Claims::new(1, "mallory"), "attacker-secret").unwrap();

        // Splice the forged payload onto the genuine signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(validate_token(&tampered, SECRET).is_err());
        assert!(validate_token("not.a.token", SECRET).is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(1, "alice", Duration::seconds(-3600)).unwrap();
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = Claims::new(1, "alice");
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer { .. })
        ));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let result = Claims::with_expiration(1, "alice", Duration::days(365 * 1_000_000));
        assert!(matches!(result, Err(JwtError::CreateError(_))));
    }

    #[test]
    fn test_expires_at_matches_claim() {
        let claims = Claims::new(1, "alice");
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }
}
