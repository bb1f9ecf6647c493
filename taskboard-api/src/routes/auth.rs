/// Authentication endpoint
///
/// # Endpoints
///
/// - `POST /auth` - Exchange username and password for a bearer token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use taskboard_shared::{services::IssuedToken, validation::LoginRequest};

/// Issues a token for valid credentials
///
/// # Endpoint
///
/// ```text
/// POST /auth
/// Content-Type: application/json
///
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "token_type": "Bearer",
///   "expires_at": "2024-01-01T01:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is not JSON
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<IssuedToken>> {
    let Json(req) = payload?;

    let token = state.services.authentication.authenticate(req).await?;

    Ok(Json(token))
}
