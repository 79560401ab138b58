//! # Catalog Types
//!
//! Read models for the remote product catalog and blog content.
//! The catalog itself lives behind the storefront API; these types only
//! mirror what it returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A watch in the remote catalog.
///
/// Watches are one-of-a-kind units, so `price_jpy` is the full unit price
/// in integer yen (JPY has no minor unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier
    pub id: u64,

    /// URL slug (e.g. "seiko-sbdc101-2021")
    pub slug: String,

    /// Display title
    pub title: String,

    /// Brand name (e.g. "Seiko", "Citizen")
    #[serde(default)]
    pub brand: String,

    /// Model reference (e.g. "SBDC101")
    #[serde(default)]
    pub model: String,

    /// Unit price in integer yen
    pub price_jpy: i64,

    /// Primary image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Condition label (e.g. "Unused", "Excellent", "Good")
    #[serde(default)]
    pub condition: String,

    /// Shipping rate-table category, when the backend assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_category: Option<u32>,
}

impl Product {
    /// Create a product with the required fields
    pub fn new(
        id: u64,
        slug: impl Into<String>,
        title: impl Into<String>,
        price_jpy: i64,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: title.into(),
            brand: String::new(),
            model: String::new(),
            price_jpy,
            image_url: None,
            condition: String::new(),
            shipping_category: None,
        }
    }

    /// Builder: set brand and model
    pub fn with_brand(mut self, brand: impl Into<String>, model: impl Into<String>) -> Self {
        self.brand = brand.into();
        self.model = model.into();
        self
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Builder: set condition label
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Builder: set shipping category
    pub fn with_shipping_category(mut self, category: u32) -> Self {
        self.shipping_category = Some(category);
        self
    }
}

/// Pagination envelope used by catalog list endpoints
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of catalog products
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(flatten)]
    pub pagination: Pagination,
}

/// A watch brand as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

/// A catalog category (divers, dress, vintage, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

/// A blog article as served by the content endpoint.
///
/// Listings omit `content`; the detail read includes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}
