//! # shop-gateway
//!
//! HTTP gateway for the Tokeido storefront session.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the cart, shipping rates and checkout
//! - Proxied reads of the remote catalog and blog
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/cart` | Cart contents and totals |
//! | POST | `/api/v1/cart/items` | Add a product |
//! | PATCH | `/api/v1/cart/items/{id}` | Change a line quantity |
//! | DELETE | `/api/v1/cart/items/{id}` | Remove a line |
//! | DELETE | `/api/v1/cart` | Empty the cart |
//! | PUT | `/api/v1/cart/country` | Select the destination |
//! | GET | `/api/v1/cart/rates` | Shipping options |
//! | PUT | `/api/v1/cart/shipping-method` | Pick a shipping method |
//! | PUT | `/api/v1/cart/insurance` | Add/drop insurance |
//! | GET | `/api/v1/cart/summary` | Price breakdown |
//! | POST | `/api/v1/checkout` | Validate and open a payment session |
//! | GET | `/api/v1/checkout/state` | Checkout phase |
//! | GET | `/api/v1/orders/{order_number}` | Order confirmation |
//! | GET | `/api/v1/products` | Catalog page |
//! | GET | `/api/v1/blog` | Blog listing |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
