//! Fleet client errors

use thiserror::Error;

/// Errors that can occur when interacting with the fleet-management API
#[derive(Debug, Error)]
pub enum FleetError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fleet API returned an error
    #[error("Fleet API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resource with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The service rejected the resource (schema or semantic validation)
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl FleetError {
    /// Whether the remote service reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, FleetError::NotFound(_))
    }

    /// Whether repeating the same call later could succeed.
    ///
    /// Rejections (`Invalid`, `AlreadyExists`, `Authentication`, `NotFound`)
    /// won't change on their own; transport and generic API failures might.
    pub fn is_transient(&self) -> bool {
        matches!(self, FleetError::Http(_) | FleetError::Api(_))
    }
}
