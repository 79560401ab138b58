//! # Checkout Orchestrator
//!
//! Gates the path from cart to payment. A submission is validated against
//! the cart state and the entered form; only a fully valid submission
//! reaches the payment-session API, and the returned hosted-payment URL is
//! the redirect target.
//!
//! Phases: `Editing → Validating → Submitting → Redirecting` on success.
//! Validation issues land back in `Editing` with the per-field issue list;
//! an API failure lands in `Error` with the message. Either way the entered
//! form is kept and nothing retries automatically. The orchestrator never
//! clears the cart; that is driven by the order-confirmation flow.

use crate::cart::Cart;
use crate::error::{ShopError, ShopResult};
use crate::order::{CustomerInfo, OrderPayload, ShippingAddress};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// One field that failed checkout validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The agreement boxes the customer must tick before paying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreements {
    #[serde(default)]
    pub terms: bool,
    #[serde(default)]
    pub no_returns: bool,
    #[serde(default)]
    pub customs: bool,
    #[serde(default)]
    pub carrier_risk: bool,
    /// Only required when insurance was added to the order
    #[serde(default)]
    pub insurance: bool,
}

/// Everything the checkout form collects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default)]
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub agreements: Agreements,
}

/// Where the checkout currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Editing,
    Validating,
    Submitting,
    Redirecting,
    Error,
}

/// Hosted payment page returned by a successful session creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
}

/// Opens payment sessions with the remote payment API.
#[async_trait]
pub trait PaymentSessions: Send + Sync {
    /// Submit the order and return the hosted payment URL to redirect to
    async fn create_session(&self, payload: &OrderPayload) -> ShopResult<CheckoutRedirect>;
}

/// Point-in-time view of the checkout for read paths
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutState {
    pub phase: CheckoutPhase,
    pub issues: Vec<FieldIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Default)]
struct FlowState {
    phase: CheckoutPhase,
    issues: Vec<FieldIssue>,
    error: Option<String>,
    redirect_url: Option<String>,
    form: Option<CheckoutForm>,
}

/// Drives the checkout phase machine over a [`PaymentSessions`] backend.
pub struct CheckoutFlow {
    sessions: Arc<dyn PaymentSessions>,
    state: Mutex<FlowState>,
}

impl CheckoutFlow {
    pub fn new(sessions: Arc<dyn PaymentSessions>) -> Self {
        Self {
            sessions,
            state: Mutex::new(FlowState::default()),
        }
    }

    /// Validate and submit one checkout attempt.
    ///
    /// Invalid submissions never reach the payment API. A concurrent
    /// submission while one is in flight is rejected outright.
    pub async fn submit(&self, cart: &Cart, form: CheckoutForm) -> ShopResult<CheckoutRedirect> {
        {
            let mut state = lock(&self.state);
            if matches!(
                state.phase,
                CheckoutPhase::Validating | CheckoutPhase::Submitting
            ) {
                return Err(ShopError::InvalidRequest(
                    "a checkout submission is already in progress".to_string(),
                ));
            }
            state.phase = CheckoutPhase::Validating;
            state.issues.clear();
            state.error = None;
            state.redirect_url = None;
            state.form = Some(form.clone());
        }

        let issues = validate(cart, &form);
        if !issues.is_empty() {
            let mut state = lock(&self.state);
            state.phase = CheckoutPhase::Editing;
            state.issues = issues.clone();
            return Err(ShopError::Validation { issues });
        }

        let payload =
            match OrderPayload::from_cart(cart, form.customer.clone(), form.shipping.clone()) {
                Some(payload) => payload,
                // validation requires a selected method, so this cannot
                // happen on a consistent cart
                None => {
                    lock(&self.state).phase = CheckoutPhase::Editing;
                    return Err(ShopError::InvalidRequest(
                        "no shipping method selected".to_string(),
                    ));
                }
            };

        lock(&self.state).phase = CheckoutPhase::Submitting;
        info!(
            items = payload.items.len(),
            total_jpy = payload.totals.total_jpy,
            reference = %payload.client_reference,
            "submitting payment session"
        );

        match self.sessions.create_session(&payload).await {
            Ok(redirect) => {
                let mut state = lock(&self.state);
                state.phase = CheckoutPhase::Redirecting;
                state.redirect_url = Some(redirect.url.clone());
                state.form = None;
                Ok(redirect)
            }
            Err(e) => {
                warn!("payment session creation failed: {e}");
                let mut state = lock(&self.state);
                state.phase = CheckoutPhase::Error;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Back to editing after an error or an abandoned redirect. Keeps the
    /// entered form, drops the stale outcome.
    pub fn resume_editing(&self) {
        let mut state = lock(&self.state);
        if matches!(
            state.phase,
            CheckoutPhase::Validating | CheckoutPhase::Submitting
        ) {
            return;
        }
        state.phase = CheckoutPhase::Editing;
        state.issues.clear();
        state.error = None;
        state.redirect_url = None;
    }

    /// Current phase plus last outcome
    pub fn state(&self) -> CheckoutState {
        let state = lock(&self.state);
        CheckoutState {
            phase: state.phase,
            issues: state.issues.clone(),
            error: state.error.clone(),
            redirect_url: state.redirect_url.clone(),
        }
    }

    /// The last submitted form, kept so a failed attempt can be re-edited
    pub fn last_form(&self) -> Option<CheckoutForm> {
        lock(&self.state).form.clone()
    }
}

impl std::fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("phase", &lock(&self.state).phase)
            .finish_non_exhaustive()
    }
}

fn validate(cart: &Cart, form: &CheckoutForm) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if cart.is_empty() {
        issues.push(FieldIssue::new("cart", "Your cart is empty"));
    }
    if cart.selected_quote().is_none() {
        issues.push(FieldIssue::new(
            "shipping_method",
            "Select a shipping method before checkout",
        ));
    }

    let customer = &form.customer;
    if customer.email.trim().is_empty() {
        issues.push(FieldIssue::new("email", "Email address is required"));
    } else if !email_shape_ok(customer.email.trim()) {
        issues.push(FieldIssue::new("email", "Email address is not valid"));
    }
    require(&mut issues, "first_name", &customer.first_name, "First name is required");
    require(&mut issues, "last_name", &customer.last_name, "Last name is required");
    require(&mut issues, "phone", &customer.phone, "Phone number is required");

    let shipping = &form.shipping;
    require(&mut issues, "line1", &shipping.line1, "Address line 1 is required");
    require(&mut issues, "city", &shipping.city, "City is required");
    require(&mut issues, "postal_code", &shipping.postal_code, "Postal code is required");
    require(&mut issues, "country", &shipping.country, "Country is required");

    let agreements = &form.agreements;
    agree(&mut issues, "terms", agreements.terms, "You must accept the terms of sale");
    agree(&mut issues, "no_returns", agreements.no_returns, "You must accept the no-returns policy");
    agree(&mut issues, "customs", agreements.customs, "You must accept responsibility for customs charges");
    agree(&mut issues, "carrier_risk", agreements.carrier_risk, "You must accept the carrier risk terms");
    if cart.insurance_requested() && !agreements.insurance {
        issues.push(FieldIssue::new(
            "insurance",
            "You must accept the shipping insurance terms",
        ));
    }

    issues
}

fn require(issues: &mut Vec<FieldIssue>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        issues.push(FieldIssue::new(field, message));
    }
}

fn agree(issues: &mut Vec<FieldIssue>, field: &str, accepted: bool, message: &str) {
    if !accepted {
        issues.push(FieldIssue::new(field, message));
    }
}

/// `local@domain.tld` shape: one `@`, non-empty local part, a dot inside
/// the domain, no whitespace
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    if email.matches('@').count() != 1 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
