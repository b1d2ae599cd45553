//! JSON bodies for the plain-HTTP routes.
//!
//! The relayed WebSocket traffic uses [`relay_core::Envelope`]; these types
//! cover only the non-WebSocket responses served on the same port.
//!
//! ```json
//! {"message":"The server is running!"}
//! {"error":"Failed to upgrade WebSocket"}
//! ```

use serde::Serialize;

/// Text returned by the health route.
pub const HEALTH_MESSAGE: &str = "The server is running!";

/// Error text returned when a WebSocket upgrade cannot be performed.
pub const UPGRADE_FAILED: &str = "Failed to upgrade WebSocket";

/// Body of a successful health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub message: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

/// Body of any error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
