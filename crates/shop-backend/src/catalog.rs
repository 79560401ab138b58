//! # Catalog Reads
//!
//! Product, brand and category lookups against the storefront API.

use crate::client::BackendClient;
use shop_core::{Brand, Category, Product, ProductPage, ShopResult};
use tracing::instrument;

impl BackendClient {
    /// One page of the catalog
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32, limit: u32) -> ShopResult<ProductPage> {
        self.get_json(
            "api/products",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// A single product by its URL slug
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> ShopResult<Product> {
        self.get_json(&format!("api/products/slug/{slug}"), &[]).await
    }

    /// The curated front-page selection
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> ShopResult<ProductPage> {
        self.get_json("api/products/featured", &[]).await
    }

    /// Most recently listed watches
    #[instrument(skip(self))]
    pub async fn new_arrivals(&self) -> ShopResult<ProductPage> {
        self.get_json("api/products/new-arrivals", &[]).await
    }

    /// All catalog categories
    #[instrument(skip(self))]
    pub async fn categories(&self) -> ShopResult<Vec<Category>> {
        self.get_json("api/categories", &[]).await
    }

    /// All listed brands
    #[instrument(skip(self))]
    pub async fn brands(&self) -> ShopResult<Vec<Brand>> {
        self.get_json("api/brands", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use shop_core::ShopError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(BackendConfig::new(server.uri()))
    }

    #[tokio::test]
    async fn test_products_paged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "24"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [
                    {
                        "id": 311,
                        "slug": "grand-seiko-sbgm221",
                        "title": "Grand Seiko SBGM221 GMT",
                        "brand": "Grand Seiko",
                        "model": "SBGM221",
                        "price_jpy": 398000,
                        "condition": "Excellent",
                        "shipping_category": 2
                    }
                ],
                "page": 2,
                "limit": 24,
                "total": 131,
                "pages": 6
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).products(2, 24).await.unwrap();
        assert_eq!(page.pagination.total, 131);
        assert_eq!(page.products[0].price_jpy, 398_000);
        assert_eq!(page.products[0].shipping_category, Some(2));
    }

    #[tokio::test]
    async fn test_product_by_slug() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/slug/citizen-nb1050"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 88,
                "slug": "citizen-nb1050",
                "title": "Citizen Series 8 NB1050",
                "price_jpy": 92000
            })))
            .mount(&server)
            .await;

        let product = client_for(&server)
            .product_by_slug("citizen-nb1050")
            .await
            .unwrap();
        assert_eq!(product.id, 88);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/slug/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).product_by_slug("nope").await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_featured_without_pagination_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/featured"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [
                    {"id": 1, "slug": "a", "title": "A", "price_jpy": 10000},
                    {"id": 2, "slug": "b", "title": "B", "price_jpy": 20000}
                ]
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).featured_products().await.unwrap();
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_brands_and_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/brands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "slug": "seiko", "name": "Seiko"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 3, "slug": "divers", "name": "Divers"},
                {"id": 4, "slug": "dress", "name": "Dress"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.brands().await.unwrap()[0].name, "Seiko");
        assert_eq!(client.categories().await.unwrap().len(), 2);
    }
}
