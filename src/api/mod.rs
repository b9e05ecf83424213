//! API Module
//!
//! HTTP handlers and routing for the discovery REST API.
//!
//! # Endpoints
//! - `GET /targets` - Latest target groups (Prometheus `http_sd`)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
