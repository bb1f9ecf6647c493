/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Token issuance
/// - `registration`: New user accounts
/// - `tasks`: Task CRUD, status changes and listings
/// - `comments`: Task comments

use serde::Serialize;

pub mod auth;
pub mod comments;
pub mod health;
pub mod registration;
pub mod tasks;

/// Confirmation body for operations with nothing else to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
