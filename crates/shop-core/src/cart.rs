//! # Cart Types
//!
//! The cart state machine: items, destination country and the currently
//! selected shipping quote.
//!
//! A quote is only valid for the exact (item set, country) pair it was
//! priced for, so every committed mutation of either clears the selection.
//! The mutators return whether anything actually changed; the store layer
//! uses that to decide when to re-persist.

use crate::catalog::Product;
use crate::shipping::ShippingQuote;
use serde::{Deserialize, Serialize};

/// One watch the customer intends to buy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog identifier, unique within the cart
    pub product_id: u64,

    /// URL slug (denormalized for links)
    pub slug: String,

    /// Display title
    pub title: String,

    /// Brand name
    #[serde(default)]
    pub brand: String,

    /// Model reference
    #[serde(default)]
    pub model: String,

    /// Unit price in integer yen
    pub price_jpy: i64,

    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Condition label
    #[serde(default)]
    pub condition: String,

    /// Quantity (>= 1; watches are unique units, so conventionally 1)
    pub quantity: u32,

    /// Shipping rate-table category, when assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_category: Option<u32>,
}

impl CartItem {
    /// Create a cart item from a catalog product, quantity 1
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            slug: product.slug.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            price_jpy: product.price_jpy,
            image_url: product.image_url.clone(),
            condition: product.condition.clone(),
            quantity: 1,
            shipping_category: product.shipping_category,
        }
    }

    /// Line total in yen (price x quantity)
    pub fn line_total_jpy(&self) -> i64 {
        self.price_jpy * i64::from(self.quantity)
    }
}

/// The cart: ordered items plus destination plus quote selection.
///
/// Items and country are durable (see [`crate::store`]); the selected quote
/// and the insurance request are session-only and always re-derived.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    country: Option<String>,
    selected_quote: Option<ShippingQuote>,
    insurance_requested: bool,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted state (quote selection never persists)
    pub fn from_persisted(items: Vec<CartItem>, country: Option<String>) -> Self {
        let mut deduped: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity >= 1 && !deduped.iter().any(|i| i.product_id == item.product_id) {
                deduped.push(item);
            }
        }
        Self {
            items: deduped,
            country,
            selected_quote: None,
            insurance_requested: false,
        }
    }

    /// Add an item. Adding an identifier already in the cart is a no-op.
    ///
    /// Returns true when the cart changed.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        if self.contains(item.product_id) {
            return false;
        }
        self.items.push(item);
        self.invalidate_quote();
        true
    }

    /// Add a catalog product with quantity 1
    pub fn add_product(&mut self, product: &Product) -> bool {
        self.add_item(CartItem::from_product(product))
    }

    /// Remove the item with this identifier, if present
    pub fn remove_item(&mut self, product_id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return false;
        }
        self.invalidate_quote();
        true
    }

    /// Set an item's quantity; a quantity below 1 removes the item
    pub fn update_quantity(&mut self, product_id: u64, quantity: u32) -> bool {
        if quantity < 1 {
            return self.remove_item(product_id);
        }
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        if item.quantity == quantity {
            return false;
        }
        item.quantity = quantity;
        self.invalidate_quote();
        true
    }

    /// Empty the item list. The destination country is kept.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() && self.selected_quote.is_none() {
            return false;
        }
        self.items.clear();
        self.invalidate_quote();
        true
    }

    /// Replace the destination country.
    ///
    /// Always drops the selected quote: a quote is priced for one exact
    /// destination and re-selecting even the same country re-opens the
    /// choice.
    pub fn set_country(&mut self, country: Option<String>) {
        self.country = country.filter(|c| !c.is_empty());
        self.invalidate_quote();
    }

    /// Replace the selected shipping quote (session-only state)
    pub fn set_shipping_quote(&mut self, quote: Option<ShippingQuote>) {
        let keeps_insurance = quote.as_ref().is_some_and(|q| q.has_insurance);
        self.selected_quote = quote;
        if !keeps_insurance {
            self.insurance_requested = false;
        }
    }

    /// Request or drop optional insurance.
    ///
    /// The request only sticks while the selected quote offers insurance.
    pub fn set_insurance(&mut self, requested: bool) {
        self.insurance_requested =
            requested && self.selected_quote.as_ref().is_some_and(|q| q.has_insurance);
    }

    fn invalidate_quote(&mut self) {
        self.selected_quote = None;
        self.insurance_requested = false;
    }

    /// Number of units in the cart (sum of quantities)
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Item subtotal in yen.
    ///
    /// Sums arithmetically even if a price is negative (a data error the
    /// backend should surface, not something to clamp here).
    pub fn subtotal_jpy(&self) -> i64 {
        self.items.iter().map(CartItem::line_total_jpy).sum()
    }

    /// Whether the cart holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether an identifier is already in the cart
    pub fn contains(&self, product_id: u64) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// The items, in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Identifiers of all items, in insertion order
    pub fn product_ids(&self) -> Vec<u64> {
        self.items.iter().map(|i| i.product_id).collect()
    }

    /// Selected destination country code, if any
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Currently selected shipping quote, if any
    pub fn selected_quote(&self) -> Option<&ShippingQuote> {
        self.selected_quote.as_ref()
    }

    /// Whether optional insurance is requested
    pub fn insurance_requested(&self) -> bool {
        self.insurance_requested
    }
}
