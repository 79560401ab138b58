//! # Shipping Types
//!
//! Destination countries and server-priced shipping quotes.
//!
//! A quote is priced by the backend for one combined shipment of the whole
//! cart. `total_price_jpy` is authoritative; it is never recomputed from
//! `base_price_jpy + extra_charge_jpy` on this side.

use serde::{Deserialize, Serialize};

/// A destination country from the backend's rate tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub country_code: String,
    pub country_name: String,
    pub zone_id: u32,
    pub zone_number: u32,
}

/// One shipping-method option for a specific (cart, country) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    /// Backend method identifier
    pub method_id: u32,

    /// Stable method code (e.g. "ems", "sal_parcel")
    pub method_code: String,

    /// English display name
    pub name_en: String,

    /// Japanese display name
    #[serde(default)]
    pub name_ja: String,

    /// Rate-table weight tier applied, in grams
    #[serde(default)]
    pub weight_grams: i64,

    /// Tier base price in yen
    #[serde(default)]
    pub base_price_jpy: i64,

    /// Zone/fuel extra charge in yen
    #[serde(default)]
    pub extra_charge_jpy: i64,

    /// Authoritative total shipping cost in yen
    pub total_price_jpy: i64,

    /// Estimated delivery, lower bound in days
    #[serde(default)]
    pub delivery_min_days: u32,

    /// Estimated delivery, upper bound in days (>= min)
    #[serde(default)]
    pub delivery_max_days: u32,

    /// Whether the method carries tracking
    #[serde(default)]
    pub has_tracking: bool,

    /// Whether optional insurance can be added
    #[serde(default)]
    pub has_insurance: bool,

    /// Largest declared value the carrier insures, in yen (0 = no stated cap)
    #[serde(default)]
    pub max_insurable_jpy: i64,
}

impl ShippingQuote {
    /// Create a quote with the required fields (mostly for tests)
    pub fn new(
        method_id: u32,
        method_code: impl Into<String>,
        name_en: impl Into<String>,
        total_price_jpy: i64,
    ) -> Self {
        Self {
            method_id,
            method_code: method_code.into(),
            name_en: name_en.into(),
            name_ja: String::new(),
            weight_grams: 0,
            base_price_jpy: 0,
            extra_charge_jpy: 0,
            total_price_jpy,
            delivery_min_days: 0,
            delivery_max_days: 0,
            has_tracking: false,
            has_insurance: false,
            max_insurable_jpy: 0,
        }
    }

    /// Builder: set the delivery estimate range
    pub fn with_delivery(mut self, min_days: u32, max_days: u32) -> Self {
        self.delivery_min_days = min_days;
        self.delivery_max_days = max_days;
        self
    }

    /// Builder: mark the method as tracked
    pub fn with_tracking(mut self) -> Self {
        self.has_tracking = true;
        self
    }

    /// Builder: mark insurance as available up to `max_jpy` declared value
    pub fn with_insurance(mut self, max_jpy: i64) -> Self {
        self.has_insurance = true;
        self.max_insurable_jpy = max_jpy;
        self
    }

    /// Delivery estimate for display, e.g. "5-10 days"
    pub fn delivery_estimate(&self) -> String {
        if self.delivery_min_days == self.delivery_max_days {
            format!("{} days", self.delivery_min_days)
        } else {
            format!("{}-{} days", self.delivery_min_days, self.delivery_max_days)
        }
    }

    /// Whether insurance can cover a declared value of `subtotal_jpy`.
    ///
    /// A zero `max_insurable_jpy` means the carrier states no cap.
    pub fn insurable_for(&self, subtotal_jpy: i64) -> bool {
        self.has_insurance && (self.max_insurable_jpy <= 0 || subtotal_jpy <= self.max_insurable_jpy)
    }
}

/// The backend's answer for one combined shipment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSheet {
    /// Ranked method options, cheapest first as the backend sends them
    #[serde(default)]
    pub rates: Vec<ShippingQuote>,

    /// Combined package weight the rates were computed for
    #[serde(default)]
    pub total_weight_grams: i64,
}
