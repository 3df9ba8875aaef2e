//! Checkout orchestrator state machine.
//!
//! One attempt runs `Idle → Creating → AwaitingPayment → Verifying →
//! Completed`. Any failure lands in `Failed` with a reason and leaves the
//! cart untouched; a cancelled payment returns to `Idle`. The cart is
//! cleared only on reaching `Completed`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storefront_cache::KvStore;
use tracing::{error, info, warn};

use crate::cart::{items_total, CartLineItem, CartStore};
use crate::checkout::{
    BackendError, CreateOrderRequest, OrderBackend, OrderHandle, PaymentEvent, PaymentEvents,
    PaymentOutcome, PaymentPrefill, PaymentRequest, PaymentWidget, ShippingDetails,
};
use crate::error::CommerceError;
use crate::ids::{OrderNumber, PaymentSessionId};
use crate::money::Money;

/// Why a checkout attempt failed. Every variant is recoverable: the cart is
/// intact and the customer may submit again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CheckoutFailure {
    /// The shipping form or the order itself was rejected.
    #[error("{0}")]
    Validation(String),

    #[error("Your cart is empty")]
    EmptyCart,

    /// The backend could not be reached or failed.
    #[error("Could not place the order: {0}. Please try again.")]
    Network(String),

    /// Order created but no payment session came back.
    #[error("Payment gateway not configured. Please contact admin.")]
    GatewayNotConfigured,

    #[error("Could not open the payment window: {0}")]
    WidgetUnavailable(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// The widget reported success but the backend did not confirm it.
    #[error("Payment verification failed: {0}. If you were charged, please contact support.")]
    Verification(String),
}

impl CheckoutFailure {
    /// Short machine-readable reason, for logs and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutFailure::Validation(_) => "validation",
            CheckoutFailure::EmptyCart => "empty_cart",
            CheckoutFailure::Network(_) => "network",
            CheckoutFailure::GatewayNotConfigured => "gateway_not_configured",
            CheckoutFailure::WidgetUnavailable(_) => "widget_unavailable",
            CheckoutFailure::PaymentFailed(_) => "payment_failed",
            CheckoutFailure::Verification(_) => "verification",
        }
    }

    fn from_create(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { message, .. } => CheckoutFailure::Validation(message),
            other => CheckoutFailure::Network(other.to_string()),
        }
    }
}

/// Where the current checkout attempt stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    /// Order-creation request in flight.
    Creating,
    /// Payment widget open.
    AwaitingPayment,
    /// Verification request in flight.
    Verifying,
    /// Payment verified; the cart has been cleared.
    Completed { order_number: OrderNumber },
    Failed(CheckoutFailure),
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Creating => "creating",
            CheckoutState::AwaitingPayment => "awaiting_payment",
            CheckoutState::Verifying => "verifying",
            CheckoutState::Completed { .. } => "completed",
            CheckoutState::Failed(_) => "failed",
        }
    }

    /// Check if a new attempt may start from this state.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, CheckoutState::Idle | CheckoutState::Failed(_))
    }

    /// Check if an attempt is past `Idle` and not yet resolved.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CheckoutState::Creating | CheckoutState::AwaitingPayment | CheckoutState::Verifying
        )
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cart and form contents one attempt works from, read once at submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSnapshot {
    pub items: Vec<CartLineItem>,
    pub details: ShippingDetails,
    pub subtotal: Money,
}

impl CheckoutSnapshot {
    /// Build the `POST /orders` body.
    pub fn to_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            details: self.details.clone(),
            items: self.items.clone(),
            subtotal: self.subtotal.amount,
            total: self.subtotal.amount,
        }
    }
}

/// What [`CheckoutOrchestrator::handle_payment_event`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event belonged to the active session and moved the machine.
    Applied,
    /// The event was stale or out of place and was dropped.
    Ignored,
}

struct Attempt {
    snapshot: CheckoutSnapshot,
    handle: OrderHandle,
    session_id: PaymentSessionId,
}

/// Drives one checkout attempt at a time from submit to a terminal outcome.
pub struct CheckoutOrchestrator<S, B, W> {
    cart: Arc<CartStore<S>>,
    backend: B,
    widget: W,
    store_name: String,
    state: CheckoutState,
    last_error: Option<CheckoutFailure>,
    attempt: Option<Attempt>,
}

impl<S, B, W> CheckoutOrchestrator<S, B, W>
where
    S: KvStore,
    B: OrderBackend,
    W: PaymentWidget,
{
    pub fn new(cart: Arc<CartStore<S>>, backend: B, widget: W) -> Self {
        Self {
            cart,
            backend,
            widget,
            store_name: "Everything Store".to_string(),
            state: CheckoutState::Idle,
            last_error: None,
            attempt: None,
        }
    }

    /// Set the store name shown in the payment widget.
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Reason for the most recent failure, until the next submit or reset.
    pub fn last_error(&self) -> Option<&CheckoutFailure> {
        self.last_error.as_ref()
    }

    /// Payment session of the attempt awaiting payment, if any.
    pub fn active_session(&self) -> Option<&PaymentSessionId> {
        self.attempt.as_ref().map(|a| &a.session_id)
    }

    /// Snapshot the active attempt is working from.
    pub fn snapshot(&self) -> Option<&CheckoutSnapshot> {
        self.attempt.as_ref().map(|a| &a.snapshot)
    }

    pub fn cart(&self) -> &Arc<CartStore<S>> {
        &self.cart
    }

    /// Start a checkout attempt.
    ///
    /// Snapshots the cart, creates the order, and opens the payment widget.
    /// Returns `Err(CheckoutInFlight)` without touching anything if an
    /// attempt is already in progress or completed; every other problem
    /// ends in [`CheckoutState::Failed`].
    pub async fn submit(&mut self, details: ShippingDetails) -> Result<(), CommerceError> {
        if !self.state.accepts_submit() {
            warn!(state = %self.state, "Rejected checkout submit");
            return Err(CommerceError::CheckoutInFlight(self.state.to_string()));
        }
        self.last_error = None;
        self.attempt = None;

        let items = self.cart.get_cart();
        if items.is_empty() {
            self.fail(CheckoutFailure::EmptyCart);
            return Ok(());
        }
        let details = details.trimmed();
        if let Err(e) = details.validate() {
            let message = match e {
                CommerceError::ValidationError(message) => message,
                other => other.to_string(),
            };
            self.fail(CheckoutFailure::Validation(message));
            return Ok(());
        }

        let snapshot = CheckoutSnapshot {
            subtotal: Money::new(items_total(&items), self.cart.currency()),
            items,
            details,
        };

        self.transition(CheckoutState::Creating);
        let handle = match self.backend.create_order(&snapshot.to_request()).await {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(CheckoutFailure::from_create(e));
                return Ok(());
            }
        };
        info!(order_number = %handle.order_number, total = %handle.total, "Order created");

        let Some(session_id) = handle.payment_session_id.clone() else {
            self.fail(CheckoutFailure::GatewayNotConfigured);
            return Ok(());
        };

        let request = PaymentRequest {
            session_id: session_id.clone(),
            order_number: handle.order_number.clone(),
            amount: handle.total,
            store_name: self.store_name.clone(),
            description: format!("Order {}", handle.order_number),
            prefill: PaymentPrefill {
                name: snapshot.details.customer_name.clone(),
                email: snapshot.details.customer_email.clone(),
                contact: snapshot.details.customer_phone.clone(),
            },
        };
        self.attempt = Some(Attempt {
            snapshot,
            handle,
            session_id,
        });
        self.transition(CheckoutState::AwaitingPayment);

        if let Err(reason) = self.widget.open(request) {
            self.fail(CheckoutFailure::WidgetUnavailable(reason));
        }
        Ok(())
    }

    /// Apply a payment widget callback.
    ///
    /// Events for any session other than the one awaiting payment are
    /// dropped. A success is verified with the backend before the cart is
    /// cleared.
    pub async fn handle_payment_event(&mut self, event: PaymentEvent) -> EventDisposition {
        let matches_session = self.state == CheckoutState::AwaitingPayment
            && self.active_session() == Some(&event.session_id);
        if !matches_session {
            warn!(
                session_id = %event.session_id,
                state = %self.state,
                "Ignoring stale payment callback"
            );
            return EventDisposition::Ignored;
        }

        match event.outcome {
            PaymentOutcome::Cancelled => {
                info!(session_id = %event.session_id, "Payment cancelled");
                self.attempt = None;
                self.transition(CheckoutState::Idle);
            }
            PaymentOutcome::Failed(reason) => {
                self.fail(CheckoutFailure::PaymentFailed(reason));
            }
            PaymentOutcome::Succeeded(receipt) => {
                if receipt.order_session_id != event.session_id {
                    warn!(
                        session_id = %event.session_id,
                        receipt_session = %receipt.order_session_id,
                        "Ignoring payment receipt for another session"
                    );
                    return EventDisposition::Ignored;
                }
                self.transition(CheckoutState::Verifying);
                match self.backend.verify_payment(&receipt).await {
                    Ok(()) => self.complete(),
                    Err(e) => self.fail(CheckoutFailure::Verification(e.to_string())),
                }
            }
        }
        EventDisposition::Applied
    }

    /// Abandon the attempt awaiting payment and return to `Idle`.
    ///
    /// Returns `false` if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if self.state != CheckoutState::AwaitingPayment {
            return false;
        }
        info!(session_id = ?self.active_session().map(|s| s.as_str()), "Checkout cancelled");
        self.attempt = None;
        self.transition(CheckoutState::Idle);
        true
    }

    /// Return from `Completed` or `Failed` to `Idle`.
    pub fn reset(&mut self) -> bool {
        match self.state {
            CheckoutState::Completed { .. } | CheckoutState::Failed(_) => {
                self.last_error = None;
                self.attempt = None;
                self.transition(CheckoutState::Idle);
                true
            }
            _ => false,
        }
    }

    /// Submit, then feed widget events until the attempt leaves
    /// `AwaitingPayment`. A closed event stream counts as a cancellation.
    pub async fn run_to_completion(
        &mut self,
        details: ShippingDetails,
        events: &mut PaymentEvents,
    ) -> Result<CheckoutState, CommerceError> {
        self.submit(details).await?;
        while self.state == CheckoutState::AwaitingPayment {
            match events.next().await {
                Some(event) => {
                    self.handle_payment_event(event).await;
                }
                None => {
                    self.cancel();
                }
            }
        }
        Ok(self.state.clone())
    }

    fn complete(&mut self) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        self.cart.clear();
        info!(order_number = %attempt.handle.order_number, "Checkout completed");
        self.transition(CheckoutState::Completed {
            order_number: attempt.handle.order_number,
        });
    }

    fn fail(&mut self, failure: CheckoutFailure) {
        error!(reason = failure.code(), error = %failure, "Checkout failed");
        self.attempt = None;
        self.last_error = Some(failure.clone());
        self.transition(CheckoutState::Failed(failure));
    }

    fn transition(&mut self, next: CheckoutState) {
        info!(from = %self.state, to = %next, "Checkout transition");
        self.state = next;
    }
}
