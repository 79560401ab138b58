//! # shop-core
//!
//! Core types and state machines for the Tokeido storefront.
//!
//! This crate provides:
//! - `Cart` and `CartStore` for the persisted shopping cart
//! - `PricingSummary` and the handling/insurance fee rules
//! - `ShippingQuoteResolver` and the `RateSource` trait for rate fetching
//! - `CheckoutFlow` and the `PaymentSessions` trait for the checkout
//!   phase machine
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CartStore, CheckoutFlow, ShippingQuoteResolver};
//!
//! // Load the cart persisted from the previous session
//! let store = CartStore::load(storage);
//! store.add_product(&product);
//! store.set_country(Some("US".to_string()));
//!
//! // Quotes follow the (items, country) pair
//! let status = resolver.refresh(&store.snapshot().product_ids(), store.snapshot().country()).await;
//!
//! // Pick a method, then check out
//! store.set_shipping_quote(status.sheet().and_then(|s| s.rates.first().cloned()));
//! let redirect = flow.submit(&store.snapshot(), form).await?;
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod order;
pub mod pricing;
pub mod resolver;
pub mod shipping;
pub mod store;

// Re-exports for convenience
pub use cart::{Cart, CartItem};
pub use catalog::{BlogPost, Brand, Category, Pagination, Product, ProductPage};
pub use checkout::{
    Agreements, CheckoutFlow, CheckoutForm, CheckoutPhase, CheckoutRedirect, CheckoutState,
    FieldIssue, PaymentSessions,
};
pub use error::{ShopError, ShopResult};
pub use order::{
    CustomerInfo, OrderConfirmation, OrderItem, OrderPayload, ShippingAddress, ShippingSelection,
};
pub use pricing::{display_jpy, PricingSummary};
pub use resolver::{RateSource, RateStatus, ShippingQuoteResolver};
pub use shipping::{Country, RateSheet, ShippingQuote};
pub use store::{CartStorage, CartStore, JsonFileStorage, MemoryStorage};
