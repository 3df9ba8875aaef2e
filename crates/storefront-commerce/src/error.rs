//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront commerce operations.
///
/// Cart operations never surface errors to their callers; these cover
/// checkout entry points and input parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// A checkout attempt is already past `Idle` and not yet resolved.
    #[error("A checkout attempt is already in progress (state: {0})")]
    CheckoutInFlight(String),

    /// The requested transition is not allowed from the current state.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Unknown currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Unknown order or payment status value.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    /// Invalid user input.
    #[error("Validation error: {0}")]
    ValidationError(String),
}
