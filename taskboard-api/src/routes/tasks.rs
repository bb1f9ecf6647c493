/// Task endpoints
///
/// All routes here sit behind the bearer middleware and receive the caller
/// as an `AuthContext` extension.
///
/// # Endpoints
///
/// - `POST   /tasks` - Create a task authored by the caller
/// - `GET    /tasks` - List every task
/// - `GET    /tasks/:id` - Fetch one task
/// - `PATCH  /tasks/:id` - Partially update the caller's task
/// - `DELETE /tasks/:id` - Delete the caller's task
/// - `PATCH  /tasks/:id/status` - Change the status
/// - `GET    /tasks/author/:author_id` - Paged tasks created by a user
/// - `GET    /tasks/assignee/:assignee_id` - Paged tasks assigned to a user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::Task,
    services::TaskListing,
    validation::{CreateTaskRequest, ListTasksQuery, StatusChangeRequest, UpdateTaskRequest},
};

/// Creates a task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// {
///   "title": "Write report",
///   "description": "Quarterly numbers",
///   "status": "pending",
///   "priority": "high",
///   "assignee": "bob"
/// }
/// ```
///
/// `status` and `priority` are case-insensitive; `assignee` is a username
/// and may be omitted.
///
/// # Errors
///
/// - `400 Bad Request`: A field is missing, empty or not a known value
/// - `404 Not Found`: The assignee does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;

    let task = state.services.tasks.create_task(req, &auth).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Applies any subset of title, description, status, priority and assignee
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let task = state.services.tasks.update_task(id, req, &auth).await?;

    Ok(Json(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;

    Ok(Json(state.services.tasks.get_task_by_id(id).await?))
}

pub async fn get_all_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.services.tasks.get_all_tasks().await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.services.tasks.delete_task(id, &auth).await?;

    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Changes a task's status
///
/// # Endpoint
///
/// ```text
/// PATCH /tasks/:id/status
/// Authorization: Bearer <token>
///
/// { "status": "in_progress" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The caller is not both author and assignee
/// - `400 Bad Request`: The status is missing or unknown
pub async fn change_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let task = state.services.tasks.change_status(id, req, &auth).await?;

    Ok(Json(task))
}

/// Tasks created by a user
///
/// # Endpoint
///
/// ```text
/// GET /tasks/author/:author_id?page=0&size=10&status=pending&priority=high
/// ```
///
/// # Response
///
/// A page of tasks, or `404` with a message naming the filters that matched
/// nothing:
///
/// ```json
/// {
///   "error": "not_found",
///   "message": "No tasks found for this author with the given status"
/// }
/// ```
pub async fn get_tasks_by_author(
    State(state): State<AppState>,
    author_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(author_id) = author_id?;
    let Query(query) = query?;

    let listing = state.services.tasks.get_tasks_by_author(author_id, query).await?;

    Ok(listing_response(listing))
}

/// Tasks assigned to a user, with the same paging and filters as the author
/// listing
pub async fn get_tasks_by_assignee(
    State(state): State<AppState>,
    assignee_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(assignee_id) = assignee_id?;
    let Query(query) = query?;

    let listing = state
        .services
        .tasks
        .get_tasks_by_assignee(assignee_id, query)
        .await?;

    Ok(listing_response(listing))
}

fn listing_response(listing: TaskListing) -> Response {
    match listing {
        TaskListing::Found(page) => Json(page).into_response(),
        TaskListing::Empty { message } => ApiError::NotFound(message).into_response(),
    }
}
