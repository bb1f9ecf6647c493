//! # Taskboard API Server Library
//!
//! HTTP surface of the Taskboard task tracker.
//!
//! ## Modules
//!
//! - `app`: Application state, router and bearer authentication
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
