//! # shop-backend
//!
//! HTTP client for the Tokeido storefront API.
//!
//! One [`BackendClient`] covers every endpoint group:
//!
//! - **shipping** - ship-to countries and combined-rate quotes
//! - **catalog** - products, brands, categories
//! - **checkout** - hosted payment-session creation
//! - **orders** - post-payment confirmation reads
//! - **blog** - content listings and articles
//!
//! The client also implements the `shop-core` seams (`RateSource`,
//! `PaymentSessions`), so the resolver and the checkout flow run against
//! it directly.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_backend::BackendClient;
//!
//! // Reads TOKEIDO_API_URL, falls back to the production endpoint
//! let client = BackendClient::from_env()?;
//!
//! let countries = client.shipping_countries().await?;
//! let rates = client.combined_rates(&[11, 42], "US").await?;
//! ```

pub mod blog;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod config;
pub mod orders;
pub mod shipping;

// Re-exports
pub use client::BackendClient;
pub use config::{BackendConfig, DEFAULT_API_URL};
