//! # Order Confirmation
//!
//! Post-payment order lookup for the confirmation flow. A missing order
//! can come back as a 404 or as a 200 `{error}` body depending on the
//! endpoint's mood; both map to `NotFound`.

use crate::client::BackendClient;
use serde::Deserialize;
use shop_core::{OrderConfirmation, ShopError, ShopResult};
use tracing::instrument;

const ORDERS_PATH: &str = "api/orders.php";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfirmationResponse {
    Error { error: String },
    Confirmation(OrderConfirmation),
}

impl BackendClient {
    /// Confirmation details for the post-payment page
    #[instrument(skip(self))]
    pub async fn order_confirmation(&self, order_number: &str) -> ShopResult<OrderConfirmation> {
        let response: ConfirmationResponse = self
            .get_json(ORDERS_PATH, &[("order_number", order_number.to_string())])
            .await?;

        match response {
            ConfirmationResponse::Confirmation(confirmation) => Ok(confirmation),
            ConfirmationResponse::Error { error } => Err(ShopError::NotFound(error)),
        }
    }
}
