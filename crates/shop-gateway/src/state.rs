//! # Application State
//!
//! Shared state for the Axum application.
//! One session's cart, resolver and checkout flow, plus the storefront
//! API client they run against.

use shop_backend::BackendClient;
use shop_core::{
    CartStorage, CartStore, CheckoutFlow, JsonFileStorage, PaymentSessions, RateSource,
    ShippingQuoteResolver,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory for the persisted cart files
    pub state_dir: PathBuf,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            state_dir: std::env::var("TOKEIDO_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./state")),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The session's persisted cart
    pub store: Arc<CartStore>,
    /// Shipping quotes for the current (items, country) pair
    pub resolver: Arc<ShippingQuoteResolver>,
    /// Checkout phase machine
    pub checkout: Arc<CheckoutFlow>,
    /// Storefront API client
    pub backend: Arc<BackendClient>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state wired to the live storefront API and file-backed
    /// cart persistence.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let backend = BackendClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize storefront client: {}", e))?;
        let storage = Arc::new(JsonFileStorage::new(&config.state_dir));

        Ok(Self::with_parts(config, Arc::new(backend), storage))
    }

    /// Create state over explicit parts. Tests pass a client pointed at a
    /// mock server and in-memory storage.
    pub fn with_parts(
        config: AppConfig,
        backend: Arc<BackendClient>,
        storage: Arc<dyn CartStorage>,
    ) -> Self {
        let store = Arc::new(CartStore::load(storage));
        let resolver = Arc::new(ShippingQuoteResolver::new(
            backend.clone() as Arc<dyn RateSource>
        ));
        let checkout = Arc::new(CheckoutFlow::new(
            backend.clone() as Arc<dyn PaymentSessions>
        ));

        Self {
            store,
            resolver,
            checkout,
            backend,
            config,
        }
    }
}
