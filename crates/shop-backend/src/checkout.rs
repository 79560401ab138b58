//! # Payment Sessions
//!
//! Opens hosted payment sessions against the storefront's checkout
//! endpoint. The endpoint answers `{success, url}` when a session was
//! opened and `{success: false, error}` when the order was refused; both
//! arrive with HTTP 200, so the body decides.

use crate::client::BackendClient;
use async_trait::async_trait;
use serde::Deserialize;
use shop_core::{CheckoutRedirect, OrderPayload, PaymentSessions, ShopError, ShopResult};
use tracing::{info, instrument};

const CHECKOUT_SESSION_PATH: &str = "api/create-checkout-session.php";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BackendClient {
    /// Submit the order and get the hosted payment URL back
    #[instrument(skip(self, payload), fields(reference = %payload.client_reference))]
    pub async fn create_checkout_session(
        &self,
        payload: &OrderPayload,
    ) -> ShopResult<CheckoutRedirect> {
        let response: SessionResponse =
            self.post_json(CHECKOUT_SESSION_PATH, &[], payload).await?;

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "payment session was refused".to_string());
            return Err(ShopError::CheckoutRejected(message));
        }
        match response.url {
            Some(url) if !url.is_empty() => {
                info!("payment session created");
                Ok(CheckoutRedirect { url })
            }
            _ => Err(ShopError::CheckoutRejected(
                "payment session response had no redirect URL".to_string(),
            )),
        }
    }
}

#[async_trait]
impl PaymentSessions for BackendClient {
    async fn create_session(&self, payload: &OrderPayload) -> ShopResult<CheckoutRedirect> {
        self.create_checkout_session(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use shop_core::{Cart, CustomerInfo, Product, ShippingAddress, ShippingQuote};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(BackendConfig::new(server.uri()))
    }

    fn payload() -> OrderPayload {
        let mut cart = Cart::new();
        cart.add_product(&Product::new(11, "seiko-sarb033", "Seiko SARB033", 45_000));
        cart.set_country(Some("US".to_string()));
        cart.set_shipping_quote(Some(ShippingQuote::new(4, "ems", "EMS", 3_300)));
        OrderPayload::from_cart(
            &cart,
            CustomerInfo {
                email: "ayaka@example.com".to_string(),
                first_name: "Ayaka".to_string(),
                last_name: "Sato".to_string(),
                phone: "+81 90 0000 0000".to_string(),
            },
            ShippingAddress::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_session_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session.php"))
            .and(body_partial_json(serde_json::json!({
                "shipping_method": {"method_id": 4, "name": "EMS"},
                "totals": {"total_jpy": 52800}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "url": "https://pay.example.com/session/abc123"
            })))
            .mount(&server)
            .await;

        let redirect = client_for(&server)
            .create_checkout_session(&payload())
            .await
            .unwrap();
        assert_eq!(redirect.url, "https://pay.example.com/session/abc123");
    }

    #[tokio::test]
    async fn test_refused_session_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "This watch was just sold"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).create_checkout_session(&payload()).await;
        match result {
            Err(ShopError::CheckoutRejected(message)) => {
                assert_eq!(message, "This watch was just sold");
            }
            other => panic!("expected CheckoutRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_url_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session.php"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).create_checkout_session(&payload()).await;
        assert!(matches!(result, Err(ShopError::CheckoutRejected(_))));
    }
}
