/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::memory::InMemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(InMemoryStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use taskboard_shared::{
    auth::middleware::bearer_token,
    services::{Services, TokenSettings},
    store::Storage,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Domain services over `store`
    pub services: Services,

    /// The backing store, probed by the health check
    pub store: Arc<dyn Storage>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Storage>, config: Config) -> Self {
        let tokens = TokenSettings::new(config.jwt.secret.clone())
            .with_expiration(chrono::Duration::minutes(config.jwt.expiration_minutes));

        Self {
            services: Services::new(store.clone(), tokens),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                          # public
/// ├── POST   /auth                            # public
/// ├── POST   /registration                    # public
/// └── /tasks                                  # bearer token required
///     ├── GET    /                            # all tasks
///     ├── POST   /                            # create
///     ├── GET    /:id
///     ├── PATCH  /:id                         # partial update
///     ├── DELETE /:id
///     ├── PATCH  /:id/status
///     ├── GET    /author/:author_id           # paged, filtered
///     ├── GET    /assignee/:assignee_id       # paged, filtered
///     ├── POST   /:id/comments
///     ├── GET    /:id/comments
///     └── DELETE /comments/:comment_id
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer authentication (task routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth", post(routes::auth::login))
        .route("/registration", post(routes::registration::register));

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::get_all_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/status", patch(routes::tasks::change_status))
        .route(
            "/tasks/author/:author_id",
            get(routes::tasks::get_tasks_by_author),
        )
        .route(
            "/tasks/assignee/:assignee_id",
            get(routes::tasks::get_tasks_by_assignee),
        )
        .route(
            "/tasks/:id/comments",
            get(routes::comments::get_comments).post(routes::comments::add_comment),
        )
        .route(
            "/tasks/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Resolves the `Authorization: Bearer` token to a stored user, then injects
/// an `AuthContext` into the request extensions.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?.to_owned();

    let auth = state.services.authentication.verify(&token).await?;
    tracing::debug!(user_id = auth.user_id, "Request authenticated");

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
