//! # Backend Client
//!
//! Shared reqwest plumbing for the storefront API: URL building, JSON
//! decoding and the mapping from transport/status failures to `ShopError`.

use crate::config::BackendConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shop_core::{ShopError, ShopResult};
use tracing::error;

/// HTTP client for the storefront API.
///
/// Cheap to clone; endpoint groups (shipping, catalog, checkout, orders,
/// blog) hang their calls off this one type.
#[derive(Debug, Clone)]
pub struct BackendClient {
    config: BackendConfig,
    http: Client,
}

impl BackendClient {
    /// Create a new client over the given config
    pub fn new(config: BackendConfig) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, http }
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Ok(Self::new(BackendConfig::from_env()?))
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// GET a JSON document
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ShopResult<T> {
        let response = self
            .http
            .get(self.config.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        self.read_json(path, response).await
    }

    /// POST a JSON body, read a JSON document back
    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> ShopResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.config.endpoint(path))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        self.read_json(path, response).await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> ShopResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ShopError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            error!("storefront API error: path={}, status={}, body={}", path, status, body);

            if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(ShopError::Api {
                    endpoint: path.to_string(),
                    message: parsed.error,
                });
            }
            return Err(ShopError::Api {
                endpoint: path.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| ShopError::Serialization(format!("{path}: {e}")))
    }
}

/// `{"error": "..."}` body the PHP endpoints return on failure
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(BackendConfig::new(server.uri()))
    }

    #[tokio::test]
    async fn test_get_json_decodes_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let pong: Pong = client.get_json("ping", &[]).await.unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: ShopResult<Pong> = client.get_json("missing", &[]).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "database unavailable"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: ShopResult<Pong> = client.get_json("broken", &[]).await;
        match result {
            Err(ShopError::Api { message, .. }) => assert_eq!(message, "database unavailable"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_serialization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: ShopResult<Pong> = client.get_json("garbled", &[]).await;
        assert!(matches!(result, Err(ShopError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_network() {
        let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:1"));
        let result: ShopResult<Pong> = client.get_json("ping", &[]).await;
        assert!(matches!(result, Err(ShopError::Network(_))));
    }
}
