//! # Taskboard Shared Library
//!
//! Domain types, storage and business rules for the Taskboard task tracker,
//! used by the HTTP API crate.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks, comments, pages, and their SQL queries
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `validation`: Typed request payloads and single-pass validation
//! - `auth`: Password hashing, JWT, caller identity and ownership checks
//! - `services`: Registration, authentication, task and comment operations
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
