//! # API Routes
//!
//! Route definitions for the Tokeido storefront gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Cart
        .route(
            "/cart",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/cart/items", post(handlers::add_item))
        .route(
            "/cart/items/{product_id}",
            patch(handlers::update_quantity).delete(handlers::remove_item),
        )
        .route("/cart/country", put(handlers::set_country))
        .route("/cart/insurance", put(handlers::set_insurance))
        .route("/cart/rates", get(handlers::get_rates))
        .route(
            "/cart/shipping-method",
            put(handlers::select_shipping_method),
        )
        .route("/cart/summary", get(handlers::get_summary))
        // Checkout
        .route("/checkout", post(handlers::submit_checkout))
        .route("/checkout/state", get(handlers::checkout_state))
        // Orders
        .route("/orders/{order_number}", get(handlers::order_confirmation))
        // Catalog
        .route("/products", get(handlers::list_products))
        .route("/products/featured", get(handlers::featured_products))
        .route("/products/new-arrivals", get(handlers::new_arrivals))
        .route("/products/slug/{slug}", get(handlers::product_by_slug))
        .route("/brands", get(handlers::list_brands))
        .route("/categories", get(handlers::list_categories))
        .route("/countries", get(handlers::list_countries))
        // Blog
        .route("/blog", get(handlers::blog_index))
        .route("/blog/{slug}", get(handlers::blog_detail));

    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use shop_backend::{BackendClient, BackendConfig};
    use shop_core::MemoryStorage;
    use std::path::PathBuf;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_server(mock: &MockServer) -> TestServer {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            state_dir: PathBuf::from("./state"),
            environment: "test".to_string(),
        };
        let state = AppState::with_parts(
            config,
            Arc::new(BackendClient::new(BackendConfig::new(mock.uri()))),
            Arc::new(MemoryStorage::new()),
        );
        TestServer::new(create_router(state)).unwrap()
    }

    fn sarb033() -> Value {
        json!({
            "id": 11,
            "slug": "seiko-sarb033",
            "title": "Seiko SARB033",
            "brand": "Seiko",
            "model": "SARB033",
            "price_jpy": 15000,
            "condition": "Excellent"
        })
    }

    fn checkout_form() -> Value {
        json!({
            "customer": {
                "email": "ayaka@example.com",
                "first_name": "Ayaka",
                "last_name": "Sato",
                "phone": "+81 90 0000 0000"
            },
            "shipping": {
                "line1": "2203 SE Division St",
                "city": "Portland",
                "state": "OR",
                "postal_code": "97201",
                "country": "US"
            },
            "agreements": {
                "terms": true,
                "no_returns": true,
                "customs": true,
                "carrier_risk": true
            }
        })
    }

    async fn mount_ems_rates(mock: &MockServer, ids: &[u64], country: &str) {
        Mock::given(method("POST"))
            .and(path("/shipping.php"))
            .and(query_param("action", "combined"))
            .and(body_json(json!({"product_ids": ids, "country": country})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": [
                    {
                        "method_id": 4,
                        "method_code": "ems",
                        "name_en": "EMS",
                        "total_price_jpy": 2500,
                        "delivery_min_days": 3,
                        "delivery_max_days": 6,
                        "has_tracking": true,
                        "has_insurance": true,
                        "max_insurable_jpy": 2000000
                    },
                    {
                        "method_id": 12,
                        "method_code": "airmail_small",
                        "name_en": "Small Packet Air",
                        "total_price_jpy": 1400
                    }
                ],
                "total_weight_grams": 450
            })))
            .mount(mock)
            .await;
    }

    #[tokio::test]
    async fn test_health() {
        let mock = MockServer::start().await;
        let server = test_server(&mock);

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "tokeido-storefront");
    }

    #[tokio::test]
    async fn test_cart_to_checkout_flow() {
        let mock = MockServer::start().await;
        mount_ems_rates(&mock, &[11], "US").await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session.php"))
            .and(body_partial_json(json!({
                "shipping_method": {"method_id": 4, "name": "EMS"},
                "totals": {"total_jpy": 19000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "url": "https://pay.example.com/session/s_123"
            })))
            .mount(&mock)
            .await;
        let server = test_server(&mock);

        // Adding the same watch twice stays one line
        let added = server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;
        assert_eq!(added.status_code(), StatusCode::OK);
        let cart: Value = server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await
            .json();
        assert_eq!(cart["items"].as_array().unwrap().len(), 1);
        assert_eq!(cart["item_count"], 1);

        // Destination, then rates
        server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "US"}))
            .await;
        let rates: Value = server.get("/api/v1/cart/rates").await.json();
        assert_eq!(rates["status"], "ready");
        assert_eq!(rates["rates"].as_array().unwrap().len(), 2);
        assert_eq!(rates["total_weight_grams"], 450);

        // Picking EMS is local, no second rate fetch
        let picked: Value = server
            .put("/api/v1/cart/shipping-method")
            .json(&json!({"method_id": 4}))
            .await
            .json();
        assert_eq!(picked["selected_method"]["method_id"], 4);

        let summary: Value = server.get("/api/v1/cart/summary").await.json();
        assert_eq!(summary["totals"]["subtotal_jpy"], 15000);
        assert_eq!(summary["totals"]["handling_fee_jpy"], 1500);
        assert_eq!(summary["totals"]["shipping_jpy"], 2500);
        assert_eq!(summary["totals"]["insurance_jpy"], 0);
        assert_eq!(summary["totals"]["total_jpy"], 19000);
        assert_eq!(summary["total_display"], "¥19,000");
        assert_eq!(summary["insurance_available"], true);

        let checkout = server
            .post("/api/v1/checkout")
            .json(&checkout_form())
            .await;
        assert_eq!(checkout.status_code(), StatusCode::OK);
        let redirect: Value = checkout.json();
        assert_eq!(redirect["url"], "https://pay.example.com/session/s_123");

        let state: Value = server.get("/api/v1/checkout/state").await.json();
        assert_eq!(state["phase"], "redirecting");
    }

    #[tokio::test]
    async fn test_add_item_by_slug() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/slug/seiko-sarb033"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sarb033()))
            .mount(&mock)
            .await;
        let server = test_server(&mock);

        let response = server
            .post("/api/v1/cart/items")
            .json(&json!({"slug": "seiko-sarb033"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let cart: Value = response.json();
        assert_eq!(cart["items"][0]["title"], "Seiko SARB033");

        let neither = server.post("/api/v1/cart/items").json(&json!({})).await;
        assert_eq!(neither.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quantity_zero_removes_line() {
        let mock = MockServer::start().await;
        let server = test_server(&mock);
        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;

        let updated: Value = server
            .patch("/api/v1/cart/items/11")
            .json(&json!({"quantity": 0}))
            .await
            .json();
        assert!(updated["items"].as_array().unwrap().is_empty());

        let missing = server
            .patch("/api/v1/cart/items/11")
            .json(&json!({"quantity": 2}))
            .await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rates_unavailable_without_country() {
        let mock = MockServer::start().await;
        let server = test_server(&mock);
        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;

        // No rate mock is mounted: a fetch would come back as an error
        let rates: Value = server.get("/api/v1/cart/rates").await.json();
        assert_eq!(rates["status"], "unavailable");
        assert!(rates["rates"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_fetch_failure_reported_in_body() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shipping.php"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Rate tables are being rebuilt"
            })))
            .mount(&mock)
            .await;
        let server = test_server(&mock);
        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;
        server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "US"}))
            .await;

        // A failed fetch is cart state, not an HTTP error
        let response = server.get("/api/v1/cart/rates").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let rates: Value = response.json();
        assert_eq!(rates["status"], "error");
        assert!(rates["error"]
            .as_str()
            .unwrap()
            .contains("Rate tables are being rebuilt"));
    }

    #[tokio::test]
    async fn test_country_change_drops_selected_method() {
        let mock = MockServer::start().await;
        mount_ems_rates(&mock, &[11], "US").await;
        let server = test_server(&mock);

        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;
        server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "US"}))
            .await;
        server.get("/api/v1/cart/rates").await;
        let picked: Value = server
            .put("/api/v1/cart/shipping-method")
            .json(&json!({"method_id": 4}))
            .await
            .json();
        assert_eq!(picked["selected_method"]["method_id"], 4);

        let moved: Value = server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "DE"}))
            .await
            .json();
        assert!(moved["selected_method"].is_null());

        let summary: Value = server.get("/api/v1/cart/summary").await.json();
        assert_eq!(summary["totals"]["shipping_jpy"], 0);
        assert_eq!(summary["totals"]["total_jpy"], 16500);
    }

    #[tokio::test]
    async fn test_unknown_shipping_method_rejected() {
        let mock = MockServer::start().await;
        mount_ems_rates(&mock, &[11], "US").await;
        let server = test_server(&mock);

        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;
        server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "US"}))
            .await;
        server.get("/api/v1/cart/rates").await;

        let response = server
            .put("/api/v1/cart/shipping-method")
            .json(&json!({"method_id": 9}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let cart: Value = server.get("/api/v1/cart").await.json();
        assert!(cart["selected_method"].is_null());
    }

    #[tokio::test]
    async fn test_checkout_validation_failure_lists_fields() {
        let mock = MockServer::start().await;
        mount_ems_rates(&mock, &[11], "US").await;
        let server = test_server(&mock);

        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;
        server
            .put("/api/v1/cart/country")
            .json(&json!({"country": "US"}))
            .await;
        server.get("/api/v1/cart/rates").await;
        server
            .put("/api/v1/cart/shipping-method")
            .json(&json!({"method_id": 4}))
            .await;

        // The payment endpoint is not mounted; validation must fail first
        let response = server.post("/api/v1/checkout").json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], 422);
        let issues = body["issues"].as_array().unwrap();
        assert!(issues.iter().any(|i| i["field"] == "email"));
        assert!(issues.iter().any(|i| i["field"] == "terms"));

        let state: Value = server.get("/api/v1/checkout/state").await.json();
        assert_eq!(state["phase"], "editing");
        assert!(!state["issues"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_order_clears_cart() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders.php"))
            .and(query_param("order_number", "TK-20260815-0031"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order_number": "TK-20260815-0031",
                "status": "paid",
                "email": "ayaka@example.com",
                "total_jpy": 19000,
                "items": [
                    {"product_id": 11, "title": "Seiko SARB033", "price_jpy": 15000, "quantity": 1}
                ]
            })))
            .mount(&mock)
            .await;
        let server = test_server(&mock);
        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;

        let response: Value = server.get("/api/v1/orders/TK-20260815-0031").await.json();
        assert_eq!(response["cart_cleared"], true);
        assert_eq!(response["status"], "paid");

        let cart: Value = server.get("/api/v1/cart").await.json();
        assert!(cart["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unpaid_order_keeps_cart() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order_number": "TK-20260815-0032",
                "status": "pending",
                "email": "ayaka@example.com",
                "total_jpy": 19000
            })))
            .mount(&mock)
            .await;
        let server = test_server(&mock);
        server
            .post("/api/v1/cart/items")
            .json(&json!({"product": sarb033()}))
            .await;

        let response: Value = server.get("/api/v1/orders/TK-20260815-0032").await.json();
        assert_eq!(response["cart_cleared"], false);

        let cart: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    }
}
