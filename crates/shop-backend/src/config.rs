//! # Backend Configuration
//!
//! Configuration for the remote storefront API.
//! The base URL comes from the environment with a production default.

use shop_core::ShopError;
use std::env;

/// Production storefront API endpoint
pub const DEFAULT_API_URL: &str = "https://api.tokeido-watches.com";

/// Storefront API configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API base URL (no trailing slash)
    pub base_url: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `TOKEIDO_API_URL` (defaults to the production endpoint)
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url =
            env::var("TOKEIDO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ShopError::Configuration(format!(
                "TOKEIDO_API_URL must be an http(s) URL, got {base_url}"
            )));
        }

        Ok(Self::new(base_url))
    }

    /// Create config with an explicit base URL (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builder: replace the base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL for a path under the API base
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = BackendConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(
            config.endpoint("shipping.php"),
            "https://api.example.com/shipping.php"
        );
        assert_eq!(
            config.endpoint("/api/products"),
            "https://api.example.com/api/products"
        );
    }

    #[test]
    fn test_from_env_rejects_non_http_url() {
        env::set_var("TOKEIDO_API_URL", "ftp://files.example.com");
        let result = BackendConfig::from_env();
        env::remove_var("TOKEIDO_API_URL");

        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_with_base_url_override() {
        let config = BackendConfig::new(DEFAULT_API_URL).with_base_url("http://127.0.0.1:9999/");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
    }
}
