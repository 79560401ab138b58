//! # Persisted Cart Store
//!
//! Single source of truth for "what is the customer buying and where".
//!
//! The item list and the selected country persist independently through a
//! [`CartStorage`] backend; the selected shipping quote never persists. A
//! storage failure is logged and swallowed; in-memory state stays
//! authoritative for the session, and unreadable persisted data loads as an
//! empty cart rather than an error.

use crate::cart::{Cart, CartItem};
use crate::catalog::Product;
use crate::error::{ShopError, ShopResult};
use crate::pricing::PricingSummary;
use crate::shipping::ShippingQuote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Durable backend for the two persisted cart slots.
///
/// Items and country are written independently, mirroring the two fixed
/// storage keys the web client uses.
pub trait CartStorage: Send + Sync {
    /// Read the persisted item list; `None` when nothing was stored
    fn load_items(&self) -> ShopResult<Option<Vec<CartItem>>>;

    /// Write the item list
    fn save_items(&self, items: &[CartItem]) -> ShopResult<()>;

    /// Read the persisted country code
    fn load_country(&self) -> ShopResult<Option<String>>;

    /// Write the country code (`None` clears it)
    fn save_country(&self, country: Option<&str>) -> ShopResult<()>;
}

/// In-memory storage, used by tests and as a no-persistence fallback
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<Option<Vec<CartItem>>>,
    country: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load_items(&self) -> ShopResult<Option<Vec<CartItem>>> {
        Ok(lock(&self.items).clone())
    }

    fn save_items(&self, items: &[CartItem]) -> ShopResult<()> {
        *lock(&self.items) = Some(items.to_vec());
        Ok(())
    }

    fn load_country(&self) -> ShopResult<Option<String>> {
        Ok(lock(&self.country).clone())
    }

    fn save_country(&self, country: Option<&str>) -> ShopResult<()> {
        *lock(&self.country) = country.map(str::to_string);
        Ok(())
    }
}

const ITEMS_FILE: &str = "cart_items.json";
const COUNTRY_FILE: &str = "cart_country.json";

/// Canonical on-disk shape for the item list
#[derive(Debug, Serialize, Deserialize)]
struct ItemsSnapshot {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// Canonical on-disk shape for the country code
#[derive(Debug, Serialize, Deserialize)]
struct CountrySnapshot {
    #[serde(default)]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// JSON-file storage under a state directory.
///
/// Reads are permissive: a bare JSON array (the shape the web client used
/// to write) is accepted alongside the canonical snapshot object. Writes
/// always produce the canonical shape. Concurrent writers are not
/// synchronized; last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, file: &str) -> ShopResult<Option<String>> {
        let path = self.dir.join(file);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShopError::Storage(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, file: &str, body: &str) -> ShopResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ShopError::Storage(format!("create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(file);
        std::fs::write(&path, body)
            .map_err(|e| ShopError::Storage(format!("write {}: {e}", path.display())))
    }
}

impl CartStorage for JsonFileStorage {
    fn load_items(&self) -> ShopResult<Option<Vec<CartItem>>> {
        let Some(text) = self.read(ITEMS_FILE)? else {
            return Ok(None);
        };
        if let Ok(snapshot) = serde_json::from_str::<ItemsSnapshot>(&text) {
            return Ok(Some(snapshot.items));
        }
        // Legacy shape: a bare array of items
        serde_json::from_str::<Vec<CartItem>>(&text)
            .map(Some)
            .map_err(|e| ShopError::Storage(format!("parse {ITEMS_FILE}: {e}")))
    }

    fn save_items(&self, items: &[CartItem]) -> ShopResult<()> {
        let snapshot = ItemsSnapshot {
            items: items.to_vec(),
            saved_at: Some(Utc::now()),
        };
        let body = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ShopError::Storage(format!("encode {ITEMS_FILE}: {e}")))?;
        self.write(ITEMS_FILE, &body)
    }

    fn load_country(&self) -> ShopResult<Option<String>> {
        let Some(text) = self.read(COUNTRY_FILE)? else {
            return Ok(None);
        };
        if let Ok(snapshot) = serde_json::from_str::<CountrySnapshot>(&text) {
            return Ok(snapshot.country.filter(|c| !c.is_empty()));
        }
        // Legacy shape: a bare string (or null)
        serde_json::from_str::<Option<String>>(&text)
            .map(|c| c.filter(|c| !c.is_empty()))
            .map_err(|e| ShopError::Storage(format!("parse {COUNTRY_FILE}: {e}")))
    }

    fn save_country(&self, country: Option<&str>) -> ShopResult<()> {
        let snapshot = CountrySnapshot {
            country: country.map(str::to_string),
            saved_at: Some(Utc::now()),
        };
        let body = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ShopError::Storage(format!("encode {COUNTRY_FILE}: {e}")))?;
        self.write(COUNTRY_FILE, &body)
    }
}

/// The injected cart store: in-memory cart plus durable backend.
///
/// Every committed item mutation re-persists the item list and every
/// country change re-persists the country; quote selection and the
/// insurance request are session-only.
pub struct CartStore {
    cart: Mutex<Cart>,
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// Initialize from storage. Unreadable or absent state loads as empty.
    pub fn load(storage: Arc<dyn CartStorage>) -> Self {
        let items = match storage.load_items() {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                warn!("cart items unreadable, starting empty: {e}");
                Vec::new()
            }
        };
        let country = match storage.load_country() {
            Ok(country) => country,
            Err(e) => {
                warn!("cart country unreadable, starting unset: {e}");
                None
            }
        };
        debug!(
            items = items.len(),
            country = country.as_deref().unwrap_or("-"),
            "cart store loaded"
        );
        Self {
            cart: Mutex::new(Cart::from_persisted(items, country)),
            storage,
        }
    }

    /// An empty store over in-memory storage (tests, ephemeral sessions)
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStorage::new()))
    }

    fn with_cart<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = lock(&self.cart);
        f(&mut cart)
    }

    fn persist_items(&self, cart: &Cart) {
        if let Err(e) = self.storage.save_items(cart.items()) {
            warn!("cart items not persisted: {e}");
        }
    }

    fn persist_country(&self, cart: &Cart) {
        if let Err(e) = self.storage.save_country(cart.country()) {
            warn!("cart country not persisted: {e}");
        }
    }

    /// Add an item; a duplicate identifier is a no-op. Returns whether the
    /// cart changed.
    pub fn add_item(&self, item: CartItem) -> bool {
        self.with_cart(|cart| {
            let changed = cart.add_item(item);
            if changed {
                self.persist_items(cart);
            }
            changed
        })
    }

    /// Add a catalog product with quantity 1
    pub fn add_product(&self, product: &Product) -> bool {
        self.add_item(CartItem::from_product(product))
    }

    /// Remove an item by identifier
    pub fn remove_item(&self, product_id: u64) -> bool {
        self.with_cart(|cart| {
            let changed = cart.remove_item(product_id);
            if changed {
                self.persist_items(cart);
            }
            changed
        })
    }

    /// Set an item's quantity; below 1 removes it
    pub fn update_quantity(&self, product_id: u64, quantity: u32) -> bool {
        self.with_cart(|cart| {
            let changed = cart.update_quantity(product_id, quantity);
            if changed {
                self.persist_items(cart);
            }
            changed
        })
    }

    /// Empty the item list (the country is kept)
    pub fn clear(&self) -> bool {
        self.with_cart(|cart| {
            let changed = cart.clear();
            if changed {
                self.persist_items(cart);
            }
            changed
        })
    }

    /// Replace the destination country and drop the quote selection
    pub fn set_country(&self, country: Option<String>) {
        self.with_cart(|cart| {
            cart.set_country(country);
            self.persist_country(cart);
        });
    }

    /// Replace the selected shipping quote (never persisted)
    pub fn set_shipping_quote(&self, quote: Option<ShippingQuote>) {
        self.with_cart(|cart| cart.set_shipping_quote(quote));
    }

    /// Request or drop optional insurance (never persisted)
    pub fn set_insurance(&self, requested: bool) {
        self.with_cart(|cart| cart.set_insurance(requested));
    }

    /// A point-in-time copy of the cart for read paths
    pub fn snapshot(&self) -> Cart {
        self.with_cart(|cart| cart.clone())
    }

    /// Number of units in the cart
    pub fn item_count(&self) -> u32 {
        self.with_cart(|cart| cart.item_count())
    }

    /// Item subtotal in yen
    pub fn subtotal_jpy(&self) -> i64 {
        self.with_cart(|cart| cart.subtotal_jpy())
    }

    /// Whether the cart holds no items
    pub fn is_empty(&self) -> bool {
        self.with_cart(|cart| cart.is_empty())
    }

    /// Current price breakdown
    pub fn pricing(&self) -> PricingSummary {
        self.with_cart(|cart| PricingSummary::for_cart(cart))
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.item_count())
            .finish_non_exhaustive()
    }
}

// A poisoned cart lock only means another thread panicked mid-mutation;
// the cart data itself is still coherent, so keep serving it.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
