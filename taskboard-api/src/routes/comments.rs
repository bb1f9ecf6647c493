/// Comment endpoints
///
/// # Endpoints
///
/// - `POST   /tasks/:id/comments` - Comment on a task
/// - `GET    /tasks/:id/comments` - List a task's comments
/// - `DELETE /tasks/comments/:comment_id` - Delete the caller's comment

use crate::{app::AppState, error::ApiResult, routes::MessageResponse};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext, models::comment::Comment, validation::CommentRequest,
};

/// Adds a comment
///
/// # Endpoint
///
/// ```text
/// POST /tasks/:id/comments
/// Authorization: Bearer <token>
///
/// { "content": "Looks good" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: The task does not exist
/// - `400 Bad Request`: Content is missing, blank or over 140 characters
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    task_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let Path(task_id) = task_id?;
    let Json(req) = payload?;

    let comment = state.services.comments.add_comment(task_id, req, &auth).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comments(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Comment>>> {
    let Path(task_id) = task_id?;

    Ok(Json(state.services.comments.get_comments_by_task(task_id).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    comment_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(comment_id) = comment_id?;
    state.services.comments.delete_comment(comment_id, &auth).await?;

    Ok(Json(MessageResponse::new("Comment deleted")))
}
