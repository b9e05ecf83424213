//! Wire models for the discovery HTTP API and output files
//!
//! This module defines the DTOs serialized to HTTP responses and to the
//! `file_sd` output.

pub mod responses;
pub mod static_config;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
pub use static_config::{render_static_configs, StaticConfig};
