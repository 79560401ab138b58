//! # Pricing Engine
//!
//! Pure fee arithmetic, recomputed on every read and never stored.
//!
//! All amounts are integer yen. The handling fee is a flat 10% of the item
//! subtotal with no floor or ceiling; the insurance tariff mirrors the
//! carrier's: free up to a declared value of 20,000 yen, then 50 yen per
//! started 20,000 yen above that.

use crate::cart::Cart;
use crate::shipping::ShippingQuote;
use serde::{Deserialize, Serialize};

/// Handling surcharge rate applied to the item subtotal
pub const HANDLING_FEE_RATE: f64 = 0.10;

/// Declared value covered for free by carrier insurance
pub const INSURANCE_FREE_THRESHOLD_JPY: i64 = 20_000;

/// Tariff step size above the free threshold
pub const INSURANCE_STEP_JPY: i64 = 20_000;

/// Fee per started tariff step
pub const INSURANCE_STEP_FEE_JPY: i64 = 50;

/// Handling fee: 10% of the subtotal, rounded to the nearest yen
pub fn handling_fee_jpy(subtotal_jpy: i64) -> i64 {
    (subtotal_jpy as f64 * HANDLING_FEE_RATE).round() as i64
}

/// Optional-insurance fee for a declared value of `subtotal_jpy`.
///
/// Zero unless insurance was requested and the quote's method offers it.
/// The first 20,000 yen of declared value is free; every started 20,000 yen
/// above that costs 50 yen.
pub fn insurance_fee_jpy(
    subtotal_jpy: i64,
    quote: Option<&ShippingQuote>,
    requested: bool,
) -> i64 {
    let Some(quote) = quote else {
        return 0;
    };
    if !requested || !quote.has_insurance {
        return 0;
    }
    if subtotal_jpy <= INSURANCE_FREE_THRESHOLD_JPY {
        return 0;
    }
    let over = subtotal_jpy - INSURANCE_FREE_THRESHOLD_JPY;
    // `over` is positive here; signed div_ceil is unstable, so divide as u64
    (over as u64).div_ceil(INSURANCE_STEP_JPY as u64) as i64 * INSURANCE_STEP_FEE_JPY
}

/// Derived price breakdown for the current cart state.
///
/// Shipping always comes from the selected quote's `total_price_jpy`; it is
/// never recomputed from the quote's parts on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingSummary {
    pub subtotal_jpy: i64,
    pub handling_fee_jpy: i64,
    pub shipping_jpy: i64,
    pub insurance_jpy: i64,
    pub total_jpy: i64,
}

impl PricingSummary {
    /// Compute the breakdown from explicit inputs
    pub fn compute(
        subtotal_jpy: i64,
        quote: Option<&ShippingQuote>,
        insurance_requested: bool,
    ) -> Self {
        let handling_fee_jpy = handling_fee_jpy(subtotal_jpy);
        let shipping_jpy = quote.map_or(0, |q| q.total_price_jpy);
        let insurance_jpy = insurance_fee_jpy(subtotal_jpy, quote, insurance_requested);
        Self {
            subtotal_jpy,
            handling_fee_jpy,
            shipping_jpy,
            insurance_jpy,
            total_jpy: subtotal_jpy + handling_fee_jpy + shipping_jpy + insurance_jpy,
        }
    }

    /// Compute the breakdown for a cart's current state
    pub fn for_cart(cart: &Cart) -> Self {
        Self::compute(
            cart.subtotal_jpy(),
            cart.selected_quote(),
            cart.insurance_requested(),
        )
    }
}

/// Format integer yen for display, e.g. "¥15,000"
pub fn display_jpy(amount_jpy: i64) -> String {
    let digits = amount_jpy.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if amount_jpy < 0 {
        out.push('-');
    }
    out.push('¥');
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
