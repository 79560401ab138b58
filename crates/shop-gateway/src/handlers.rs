//! # Request Handlers
//!
//! Axum request handlers for the storefront session API: the cart and its
//! pricing, shipping rates and method selection, checkout, order
//! confirmation, and thin proxies over the remote catalog and blog.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{
    display_jpy, BlogPost, Brand, Cart, CartItem, Category, CheckoutForm, CheckoutRedirect,
    CheckoutState, Country, FieldIssue, OrderConfirmation, PricingSummary, Product, ProductPage,
    RateStatus, ShippingQuote, ShopError,
};
use tracing::{info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Add-to-cart request
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// The product to add, as rendered on the product page
    #[serde(default)]
    pub product: Option<Product>,
    /// Convenience: catalog slug (alternative to the full product object)
    #[serde(default)]
    pub slug: Option<String>,
}

/// Quantity change for one cart line
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Destination country selection (`null` clears it)
#[derive(Debug, Deserialize)]
pub struct SetCountryRequest {
    #[serde(default)]
    pub country: Option<String>,
}

/// Insurance opt-in/out
#[derive(Debug, Deserialize)]
pub struct SetInsuranceRequest {
    pub requested: bool,
}

/// Shipping method selection (`null` clears the selection)
#[derive(Debug, Deserialize)]
pub struct SelectShippingMethodRequest {
    #[serde(default)]
    pub method_id: Option<u32>,
}

/// Page selector for catalog listings
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    24
}

/// Optional category filter for the blog listing
#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// Cart view returned by every cart read and mutation
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub country: Option<String>,
    pub selected_method: Option<ShippingQuote>,
    pub insurance_requested: bool,
    pub totals: PricingSummary,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            country: cart.country().map(str::to_string),
            selected_method: cart.selected_quote().cloned(),
            insurance_requested: cart.insurance_requested(),
            totals: PricingSummary::for_cart(cart),
        }
    }
}

/// Current shipping options for the cart
#[derive(Debug, Serialize)]
pub struct RatesResponse {
    /// "ready", "unavailable" or "error"
    pub status: &'static str,
    pub rates: Vec<ShippingQuote>,
    pub total_weight_grams: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub selected_method_id: Option<u32>,
}

/// Price breakdown plus the selection context it was computed from
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub item_count: u32,
    pub totals: PricingSummary,
    pub total_display: String,
    pub country: Option<String>,
    pub selected_method_id: Option<u32>,
    pub insurance_requested: bool,
    /// Whether the selected method can insure this order value
    pub insurance_available: bool,
}

/// Order confirmation plus what the gateway did about it
#[derive(Debug, Serialize)]
pub struct ConfirmationView {
    #[serde(flatten)]
    pub order: OrderConfirmation,
    pub cart_cleared: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            issues: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_issues(mut self, issues: Vec<FieldIssue>) -> Self {
        self.issues = issues;
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn shop_error_to_response(err: ShopError) -> ApiError {
    let code = err.status_code();
    let response = match err {
        ShopError::Validation { issues } => {
            ErrorResponse::new("Checkout validation failed", code).with_issues(issues)
        }
        err => ErrorResponse::new(err.to_string(), code),
    };
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Health
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tokeido-storefront",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// =============================================================================
// Cart
// =============================================================================

/// Current cart contents and totals
pub async fn get_cart(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from_cart(&state.store.snapshot()))
}

/// Add a product to the cart. Adding an id that is already present is a
/// no-op, not a second line.
#[instrument(skip(state, request))]
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let product = match (request.product, request.slug) {
        (Some(product), _) => product,
        (None, Some(slug)) => state
            .backend
            .product_by_slug(&slug)
            .await
            .map_err(shop_error_to_response)?,
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "Provide 'product' or 'slug' to add an item",
                    400,
                )),
            ));
        }
    };

    if state.store.add_product(&product) {
        info!(product_id = product.id, "item added to cart");
        state.checkout.resume_editing();
    }
    Ok(Json(CartView::from_cart(&state.store.snapshot())))
}

/// Change a line's quantity; a quantity below 1 removes the line
#[instrument(skip(state))]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(product_id): Path<u64>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    if !state.store.snapshot().contains(product_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("No cart item with id {product_id}"),
                404,
            )),
        ));
    }

    if state.store.update_quantity(product_id, request.quantity) {
        state.checkout.resume_editing();
    }
    Ok(Json(CartView::from_cart(&state.store.snapshot())))
}

/// Remove one line from the cart
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(product_id): Path<u64>,
) -> Result<Json<CartView>, ApiError> {
    if !state.store.remove_item(product_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("No cart item with id {product_id}"),
                404,
            )),
        ));
    }

    state.checkout.resume_editing();
    Ok(Json(CartView::from_cart(&state.store.snapshot())))
}

/// Empty the cart. The destination country is kept.
#[instrument(skip(state))]
pub async fn clear_cart(State(state): State<AppState>) -> Json<CartView> {
    if state.store.clear() {
        state.checkout.resume_editing();
    }
    Json(CartView::from_cart(&state.store.snapshot()))
}

/// Select the destination country. Any selected shipping method is
/// dropped, since its quote was computed for the old destination.
#[instrument(skip(state, request), fields(country = request.country.as_deref().unwrap_or("-")))]
pub async fn set_country(
    State(state): State<AppState>,
    Json(request): Json<SetCountryRequest>,
) -> Json<CartView> {
    state.store.set_country(request.country);
    state.checkout.resume_editing();
    Json(CartView::from_cart(&state.store.snapshot()))
}

/// Request or drop optional shipping insurance
#[instrument(skip(state))]
pub async fn set_insurance(
    State(state): State<AppState>,
    Json(request): Json<SetInsuranceRequest>,
) -> Json<SummaryResponse> {
    state.store.set_insurance(request.requested);
    Json(summary_of(&state.store.snapshot()))
}

// =============================================================================
// Shipping Rates
// =============================================================================

/// Shipping options for the current (items, country) pair.
///
/// Fetches from the rate backend only when the pair changed since the
/// last successful fetch; a stale in-flight response can never clobber a
/// newer one.
#[instrument(skip(state))]
pub async fn get_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let cart = state.store.snapshot();
    let status = state
        .resolver
        .refresh(&cart.product_ids(), cart.country())
        .await;

    let selected = cart.selected_quote().map(|q| q.method_id);
    Json(rates_response(status, selected))
}

/// Pick a shipping method from the fetched options. Selection is local;
/// it never triggers a rate fetch.
#[instrument(skip(state, request), fields(method_id = ?request.method_id))]
pub async fn select_shipping_method(
    State(state): State<AppState>,
    Json(request): Json<SelectShippingMethodRequest>,
) -> Result<Json<CartView>, ApiError> {
    let Some(method_id) = request.method_id else {
        state.store.set_shipping_quote(None);
        state.checkout.resume_editing();
        return Ok(Json(CartView::from_cart(&state.store.snapshot())));
    };

    let quote = state
        .resolver
        .current()
        .sheet()
        .and_then(|sheet| sheet.rates.iter().find(|q| q.method_id == method_id).cloned());

    match quote {
        Some(quote) => {
            info!(method_id, method = %quote.name_en, "shipping method selected");
            state.store.set_shipping_quote(Some(quote));
            state.checkout.resume_editing();
            Ok(Json(CartView::from_cart(&state.store.snapshot())))
        }
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Shipping method {method_id} is not offered for this cart"),
                400,
            )),
        )),
    }
}

/// Price breakdown for the cart as it stands
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    Json(summary_of(&state.store.snapshot()))
}

fn rates_response(status: RateStatus, selected_method_id: Option<u32>) -> RatesResponse {
    match status {
        RateStatus::Ready(sheet) => RatesResponse {
            status: "ready",
            rates: sheet.rates,
            total_weight_grams: sheet.total_weight_grams,
            error: None,
            selected_method_id,
        },
        RateStatus::Unavailable => RatesResponse {
            status: "unavailable",
            rates: Vec::new(),
            total_weight_grams: 0,
            error: None,
            selected_method_id,
        },
        RateStatus::Failed(message) => RatesResponse {
            status: "error",
            rates: Vec::new(),
            total_weight_grams: 0,
            error: Some(message),
            selected_method_id,
        },
    }
}

fn summary_of(cart: &Cart) -> SummaryResponse {
    let totals = PricingSummary::for_cart(cart);
    let total_display = display_jpy(totals.total_jpy);

    SummaryResponse {
        item_count: cart.item_count(),
        totals,
        total_display,
        country: cart.country().map(str::to_string),
        selected_method_id: cart.selected_quote().map(|q| q.method_id),
        insurance_requested: cart.insurance_requested(),
        insurance_available: cart
            .selected_quote()
            .map(|q| q.insurable_for(cart.subtotal_jpy()))
            .unwrap_or(false),
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Validate the checkout form and open a payment session.
///
/// An invalid submission returns 422 with the per-field issue list and
/// never reaches the payment API.
#[instrument(skip(state, form))]
pub async fn submit_checkout(
    State(state): State<AppState>,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutRedirect>, ApiError> {
    let cart = state.store.snapshot();
    let redirect = state
        .checkout
        .submit(&cart, form)
        .await
        .map_err(shop_error_to_response)?;

    Ok(Json(redirect))
}

/// Where the checkout currently stands (phase, issues, redirect URL)
pub async fn checkout_state(State(state): State<AppState>) -> Json<CheckoutState> {
    Json(state.checkout.state())
}

// =============================================================================
// Orders
// =============================================================================

/// Confirmation read for the post-payment page.
///
/// A server-confirmed order clears the local cart; anything else leaves
/// it untouched, so an abandoned payment keeps the items.
#[instrument(skip(state))]
pub async fn order_confirmation(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ConfirmationView>, ApiError> {
    let order = state
        .backend
        .order_confirmation(&order_number)
        .await
        .map_err(shop_error_to_response)?;

    let cart_cleared = order.is_confirmed();
    if cart_cleared {
        state.store.clear();
        state.checkout.resume_editing();
        info!(order_number = %order.order_number, "cart cleared after confirmed order");
    }

    Ok(Json(ConfirmationView {
        order,
        cart_cleared,
    }))
}

// =============================================================================
// Catalog & Content Proxies
// =============================================================================

/// Countries the store ships to
pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Country>>, ApiError> {
    state
        .backend
        .shipping_countries()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// One page of the catalog
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    state
        .backend
        .products(query.page, query.limit)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// The curated front-page selection
pub async fn featured_products(
    State(state): State<AppState>,
) -> Result<Json<ProductPage>, ApiError> {
    state
        .backend
        .featured_products()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// Most recently listed watches
pub async fn new_arrivals(State(state): State<AppState>) -> Result<Json<ProductPage>, ApiError> {
    state
        .backend
        .new_arrivals()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// A single product by its URL slug
pub async fn product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .backend
        .product_by_slug(&slug)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// All listed brands
pub async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, ApiError> {
    state
        .backend
        .brands()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// All catalog categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    state
        .backend
        .categories()
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// Blog listing, optionally filtered to one category
pub async fn blog_index(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = match query.category {
        Some(category) => state.backend.blog_posts_in_category(&category).await,
        None => state.backend.blog_posts().await,
    };
    posts.map(Json).map_err(shop_error_to_response)
}

/// One blog article with its full content
pub async fn blog_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .backend
        .blog_post(&slug)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::RateSheet;

    #[test]
    fn test_rates_response_mapping() {
        let ready = rates_response(
            RateStatus::Ready(RateSheet {
                rates: vec![ShippingQuote::new(4, "ems", "EMS", 2_500)],
                total_weight_grams: 900,
            }),
            Some(4),
        );
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.rates.len(), 1);
        assert_eq!(ready.selected_method_id, Some(4));

        let failed = rates_response(RateStatus::Failed("boom".to_string()), None);
        assert_eq!(failed.status, "error");
        assert!(failed.rates.is_empty());
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let idle = rates_response(RateStatus::Unavailable, None);
        assert_eq!(idle.status, "unavailable");
        assert!(idle.error.is_none());
    }

    #[test]
    fn test_summary_insurance_hint() {
        let mut cart = Cart::new();
        cart.add_product(&Product::new(1, "w", "Watch", 15_000));
        cart.set_country(Some("US".to_string()));
        cart.set_shipping_quote(Some(
            ShippingQuote::new(4, "ems", "EMS", 2_500).with_insurance(2_000_000),
        ));

        let summary = summary_of(&cart);
        assert!(summary.insurance_available);
        assert!(!summary.insurance_requested);
        assert_eq!(summary.totals.total_jpy, 19_000);
        assert_eq!(summary.total_display, "¥19,000");
    }

    #[test]
    fn test_validation_error_carries_issues() {
        let err = ShopError::Validation {
            issues: vec![FieldIssue::new("email", "Email address is required")],
        };
        let (status, Json(body)) = shop_error_to_response(err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.issues.len(), 1);
        assert_eq!(body.code, 422);
    }
}
