/// Middleware modules for the API server
///
/// Bearer authentication lives beside the router in [`crate::app`] because it
/// needs the application state.

pub mod security;
