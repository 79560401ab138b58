//! # Tokeido Storefront
//!
//! Session gateway for the Tokeido watch store.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the storefront API (defaults to production)
//! export TOKEIDO_API_URL=https://api.tokeido-watches.com
//! export TOKEIDO_STATE_DIR=./state
//!
//! # Run the server
//! tokeido-storefront
//! ```

use shop_gateway::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Storefront API: {}", state.backend.config().base_url);
    info!("Cart state dir: {}", state.config.state_dir.display());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("⌚ Tokeido storefront starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🛒 Cart: http://{}/api/v1/cart", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⌚ Tokeido Storefront ⌚
  ━━━━━━━━━━━━━━━━━━━━━━━
  Watches, direct from Japan
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
