//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the `/api` endpoints
//! - Download / process-video handlers that drive the request pipeline
//! - Audio file serving from the artifact store
//! - Request logging and CORS middleware

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
