/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 token issuance and validation
/// - [`middleware`]: Caller identity and bearer header parsing
/// - [`authorization`]: Author/assignee ownership checks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret1")?;
/// assert!(verify_password("secret1", &hash)?);
///
/// let token = create_token(&Claims::new(1, "alice"), "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
