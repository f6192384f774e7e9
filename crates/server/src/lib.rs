//! HTTP API server for the Pharos indexing service.
//!
//! This crate provides the HTTP surface of the query engine:
//! - Claims query endpoint
//! - Health check
//! - Configuration-driven service wiring

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
