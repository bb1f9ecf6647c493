//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A router over a fresh in-memory store
//! - Test user creation with ready-made bearer tokens
//! - A JSON request helper that drives the router directly

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, JwtConfig, LogFormat, StorageBackend};
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::models::user::CreateUser;
use taskboard_shared::store::{memory::InMemoryStore, UserStore};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// A user that exists in the store, with a valid token
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: InMemoryStore,
    pub app: Router,
    pub config: Config,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        storage: StorageBackend::Memory,
        database: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_minutes: 60,
        },
        log_format: LogFormat::Pretty,
    }
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let config = test_config();
        let app = build_router(AppState::new(Arc::new(store.clone()), config.clone()));

        Self { store, app, config }
    }

    /// Inserts a user directly and signs a token for it, skipping password
    /// hashing
    pub async fn seed_user(&self, username: &str) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .expect("Failed to create user");

        let claims = Claims::new(user.id, user.username.clone());
        let token = create_token(&claims, &self.config.jwt.secret).expect("Failed to sign token");

        TestUser {
            id: user.id,
            username: user.username,
            token,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for an empty body)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Creates a task through the API and returns its id
    pub async fn create_task(&self, token: &str, body: Value) -> i64 {
        let (status, task) = self.post("/tasks", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {task}");
        task["id"].as_i64().expect("Task id missing")
    }
}

/// A complete create-task body
pub fn task_body(title: &str, status: &str, priority: &str, assignee: Option<&str>) -> Value {
    let mut body = serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "status": status,
        "priority": priority,
    });

    if let Some(assignee) = assignee {
        body["assignee"] = Value::String(assignee.to_string());
    }

    body
}

/// Field names in a validation error response
pub fn detail_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
