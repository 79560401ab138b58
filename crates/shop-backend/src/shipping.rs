//! # Shipping Rates
//!
//! Countries and combined-rate quotes from the shipping endpoint. The
//! endpoint multiplexes on an `action` query parameter and reports its own
//! failures as a 200 with an `{error}` body, so the response is parsed as a
//! union before anything reaches the caller.

use crate::client::BackendClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shop_core::{Country, RateSheet, RateSource, ShopError, ShopResult};
use tracing::{debug, instrument};

const SHIPPING_PATH: &str = "shipping.php";

#[derive(Debug, Serialize)]
struct CombinedRateRequest<'a> {
    product_ids: &'a [u64],
    country: &'a str,
}

/// Success sheet or `{error}`. Variant order matters: a defaulted
/// [`RateSheet`] would happily swallow an error body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CombinedRateResponse {
    Error { error: String },
    Rates(RateSheet),
}

impl BackendClient {
    /// Countries the store ships to
    #[instrument(skip(self))]
    pub async fn shipping_countries(&self) -> ShopResult<Vec<Country>> {
        self.get_json(SHIPPING_PATH, &[("action", "countries".to_string())])
            .await
    }

    /// Quote every available method for shipping `product_ids` together to
    /// `country`. The response also echoes the products; only the rates and
    /// the combined weight are kept.
    #[instrument(skip(self), fields(items = product_ids.len(), country))]
    pub async fn combined_rates(
        &self,
        product_ids: &[u64],
        country: &str,
    ) -> ShopResult<RateSheet> {
        let request = CombinedRateRequest {
            product_ids,
            country,
        };
        let response: CombinedRateResponse = self
            .post_json(SHIPPING_PATH, &[("action", "combined".to_string())], &request)
            .await?;

        match response {
            CombinedRateResponse::Rates(sheet) => {
                debug!(methods = sheet.rates.len(), "combined rates fetched");
                Ok(sheet)
            }
            CombinedRateResponse::Error { error } => Err(ShopError::Api {
                endpoint: SHIPPING_PATH.to_string(),
                message: error,
            }),
        }
    }
}

#[async_trait]
impl RateSource for BackendClient {
    async fn combined_rates(&self, product_ids: &[u64], country: &str) -> ShopResult<RateSheet> {
        BackendClient::combined_rates(self, product_ids, country).await
    }
}
