//! # Order Payload & Confirmation
//!
//! The one-shot payload submitted to the payment-session endpoint, and the
//! confirmation read back after payment. The payload is assembled from
//! current state at submit time and never persisted locally; the resulting
//! order lives on the remote side.

use crate::cart::{Cart, CartItem};
use crate::pricing::PricingSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer contact fields collected at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Destination address collected at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// One purchased line as the payment API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: u64,
    pub title: String,
    pub price_jpy: i64,
    pub quantity: u32,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            title: item.title.clone(),
            price_jpy: item.price_jpy,
            quantity: item.quantity,
        }
    }
}

/// The shipping method the customer picked, by id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSelection {
    pub method_id: u32,
    pub name: String,
}

/// Everything the remote needs to open a payment session.
///
/// `client_reference` is generated fresh per submission so the remote can
/// deduplicate replays of the same attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub items: Vec<OrderItem>,
    pub customer: CustomerInfo,
    pub shipping: ShippingAddress,
    pub shipping_method: ShippingSelection,
    pub totals: PricingSummary,
    pub client_reference: Uuid,
}

impl OrderPayload {
    /// Snapshot the cart into a payload.
    ///
    /// Returns `None` when no shipping method is selected; checkout
    /// validation rejects that case before this is reached.
    pub fn from_cart(cart: &Cart, customer: CustomerInfo, shipping: ShippingAddress) -> Option<Self> {
        let quote = cart.selected_quote()?;
        Some(Self {
            items: cart.items().iter().map(OrderItem::from).collect(),
            customer,
            shipping,
            shipping_method: ShippingSelection {
                method_id: quote.method_id,
                name: quote.name_en.clone(),
            },
            totals: PricingSummary::for_cart(cart),
            client_reference: Uuid::new_v4(),
        })
    }
}

/// Post-payment order state as served by the orders endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_jpy: Option<i64>,
    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl OrderConfirmation {
    /// Whether the remote considers this order settled. Only a confirmed
    /// order may clear the local cart.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status.as_str(), "paid" | "confirmed" | "completed")
    }
}
