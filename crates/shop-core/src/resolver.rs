//! # Shipping Quote Resolver
//!
//! Keeps the available shipping quotes in sync with the cart contents and
//! destination country. Rates come from a pluggable [`RateSource`] so the
//! live HTTP backend and test fakes plug in the same way.
//!
//! Refresh rules:
//! - no items or no country: quotes are cleared without touching the source
//! - the (item set, country) pair already quoted successfully: served from
//!   the cached sheet without touching the source
//! - anything else: a fresh combined-rate fetch
//!
//! Overlapping refreshes are resolved by a generation counter: every new
//! refresh invalidates the responses of the ones still in flight, so a slow
//! response for an outdated cart can never overwrite a newer sheet.

use crate::error::ShopResult;
use crate::shipping::RateSheet;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Provider of combined shipping rates for a set of products and a
/// destination country.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Quote every available shipping method for shipping all of
    /// `product_ids` together to `country`.
    async fn combined_rates(&self, product_ids: &[u64], country: &str) -> ShopResult<RateSheet>;
}

/// What the resolver can currently offer.
#[derive(Debug, Clone, PartialEq)]
pub enum RateStatus {
    /// Nothing to quote: the cart is empty or the destination is unset
    Unavailable,
    /// Quotes for the current cart and destination
    Ready(RateSheet),
    /// The last fetch failed; no method can be selected until a retry
    Failed(String),
}

impl RateStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, RateStatus::Ready(_))
    }

    /// The quoted sheet, when one is available
    pub fn sheet(&self) -> Option<&RateSheet> {
        match self {
            RateStatus::Ready(sheet) => Some(sheet),
            _ => None,
        }
    }
}

/// The (item set, country) pair a sheet was quoted for
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuoteKey {
    product_ids: Vec<u64>,
    country: String,
}

impl QuoteKey {
    fn new(product_ids: &[u64], country: &str) -> Self {
        let mut product_ids = product_ids.to_vec();
        product_ids.sort_unstable();
        product_ids.dedup();
        Self {
            product_ids,
            country: country.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct ResolverState {
    rates: Option<RateSheet>,
    quoted_for: Option<QuoteKey>,
    last_error: Option<String>,
}

/// Serializes rate refreshes against a [`RateSource`] and retains the most
/// recent outcome.
pub struct ShippingQuoteResolver {
    source: Arc<dyn RateSource>,
    generation: AtomicU64,
    state: Mutex<ResolverState>,
}

impl ShippingQuoteResolver {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Bring the quotes in line with the given cart contents and country.
    ///
    /// Returns the resulting status. A response that arrives after a newer
    /// refresh has started is discarded.
    pub async fn refresh(&self, product_ids: &[u64], country: Option<&str>) -> RateStatus {
        let country = match country.filter(|c| !c.is_empty()) {
            Some(c) if !product_ids.is_empty() => c,
            _ => {
                // Nothing to quote. Bumping the generation first makes any
                // in-flight fetch land stale instead of resurrecting quotes.
                self.generation.fetch_add(1, Ordering::SeqCst);
                *lock(&self.state) = ResolverState::default();
                return RateStatus::Unavailable;
            }
        };

        let key = QuoteKey::new(product_ids, country);
        {
            let state = lock(&self.state);
            if state.quoted_for.as_ref() == Some(&key) {
                if let Some(rates) = &state.rates {
                    debug!(country, "rates served from cache");
                    return RateStatus::Ready(rates.clone());
                }
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            generation,
            country,
            items = key.product_ids.len(),
            "fetching combined rates"
        );
        let result = self.source.combined_rates(&key.product_ids, country).await;

        let mut state = lock(&self.state);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding stale rate response");
            return status_of(&state);
        }
        match result {
            Ok(sheet) => {
                debug!(methods = sheet.rates.len(), "rates refreshed");
                state.rates = Some(sheet.clone());
                state.quoted_for = Some(key);
                state.last_error = None;
                RateStatus::Ready(sheet)
            }
            Err(e) => {
                warn!(country, "combined rate fetch failed: {e}");
                state.rates = None;
                state.quoted_for = None;
                state.last_error = Some(e.to_string());
                RateStatus::Failed(e.to_string())
            }
        }
    }

    /// The most recent outcome without triggering a fetch
    pub fn current(&self) -> RateStatus {
        status_of(&lock(&self.state))
    }

    /// Whether the current sheet offers the given method
    pub fn offers_method(&self, method_id: u32) -> bool {
        lock(&self.state)
            .rates
            .as_ref()
            .is_some_and(|sheet| sheet.rates.iter().any(|q| q.method_id == method_id))
    }
}

impl std::fmt::Debug for ShippingQuoteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingQuoteResolver")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn status_of(state: &ResolverState) -> RateStatus {
    if let Some(message) = &state.last_error {
        return RateStatus::Failed(message.clone());
    }
    match &state.rates {
        Some(rates) => RateStatus::Ready(rates.clone()),
        None => RateStatus::Unavailable,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
