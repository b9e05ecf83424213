//! Error types for service discovery
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Discovery Error Enum ==
/// Unified error type for the discovery service.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A call to the orchestration API failed
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No refresh has completed successfully yet
    #[error("No targets discovered yet")]
    NotReady,

    /// Filesystem failure while writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// Shorthand for a failed remote call.
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        DiscoveryError::Remote {
            operation,
            message: message.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        let status = match &self {
            DiscoveryError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            DiscoveryError::Config(_) => StatusCode::BAD_REQUEST,
            DiscoveryError::Remote { .. } => StatusCode::BAD_GATEWAY,
            DiscoveryError::Io(_) | DiscoveryError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the discovery service.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
