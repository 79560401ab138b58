//! # Storefront Error Types
//!
//! Typed error handling for the storefront core.
//! All fallible operations return `Result<T, ShopError>`.

use crate::checkout::FieldIssue;
use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing env vars, invalid base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data from the caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Checkout form validation failed
    #[error("Checkout validation failed ({} issue(s))", issues.len())]
    Validation { issues: Vec<FieldIssue> },

    /// Product not found in the remote catalog
    #[error("Product not found: {slug}")]
    ProductNotFound { slug: String },

    /// Missing resource (order number, blog post, ...)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote storefront API answered with an error payload
    #[error("Backend error [{endpoint}]: {message}")]
    Api { endpoint: String, message: String },

    /// The payment-session API refused to create a session
    #[error("Checkout session rejected: {0}")]
    CheckoutRejected(String),

    /// Network/HTTP error reaching the remote API
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Durable cart storage failed (logged, never user-facing)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns true if retrying the same call later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::Network(_) | ShopError::Api { .. } | ShopError::CheckoutRejected(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::Validation { .. } => 422,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::NotFound(_) => 404,
            ShopError::Api { .. } => 502,
            ShopError::CheckoutRejected(_) => 502,
            ShopError::Network(_) => 503,
            ShopError::Serialization(_) => 500,
            ShopError::Storage(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ShopError::Network("timeout".into()).is_retryable());
        assert!(ShopError::Api {
            endpoint: "shipping.php".into(),
            message: "rate table offline".into()
        }
        .is_retryable());
        assert!(!ShopError::InvalidRequest("bad data".into()).is_retryable());
        assert!(!ShopError::Storage("disk full".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::InvalidRequest("test".into()).status_code(), 400);
        assert_eq!(
            ShopError::ProductNotFound { slug: "x".into() }.status_code(),
            404
        );
        assert_eq!(ShopError::Validation { issues: vec![] }.status_code(), 422);
        assert_eq!(ShopError::Network("down".into()).status_code(), 503);
        assert_eq!(
            ShopError::Api {
                endpoint: "orders.php".into(),
                message: "boom".into()
            }
            .status_code(),
            502
        );
    }
}
