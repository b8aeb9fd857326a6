//! Integration testing module
//!
//! End-to-end tests for the server:
//! - Download / process-video flows through the HTTP router
//! - Audio serving from the artifact store
//! - Error responses and their status codes

pub mod e2e;
pub mod fixtures;
