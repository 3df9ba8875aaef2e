//! Checkout module.
//!
//! Contains the shipping form, order types, the payment-widget and backend
//! seams, and the checkout orchestrator state machine.

mod backend;
mod details;
mod flow;
mod order;
mod payment;

pub use backend::{BackendError, BackendResult, OrderBackend};
pub use details::ShippingDetails;
pub use flow::{
    CheckoutFailure, CheckoutOrchestrator, CheckoutSnapshot, CheckoutState, EventDisposition,
};
pub use order::{
    CreateOrderRequest, OrderHandle, OrderItem, OrderStatus, PaymentStatus, TrackedOrder,
};
pub use payment::{
    PaymentChannel, PaymentEvent, PaymentEvents, PaymentOutcome, PaymentPrefill, PaymentReceipt,
    PaymentRequest, PaymentWidget,
};
