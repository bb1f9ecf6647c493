/// Registration endpoint
///
/// # Endpoints
///
/// - `POST /registration` - Create a user account

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use taskboard_shared::{models::user::User, validation::RegistrationRequest};

/// Registers a new user
///
/// # Endpoint
///
/// ```text
/// POST /registration
/// Content-Type: application/json
///
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// # Response
///
/// The created user, without its password hash.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or the username is taken
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(req) = payload?;

    let user = state.services.registration.register_new_user(req).await?;

    Ok(Json(user))
}
