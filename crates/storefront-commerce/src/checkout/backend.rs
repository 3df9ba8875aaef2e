//! Order backend seam.

use async_trait::async_trait;

use crate::checkout::{CreateOrderRequest, OrderHandle, PaymentReceipt};

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Why a backend call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend failed (5xx).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The backend refused the request (4xx).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Check if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Network(_) | BackendError::Server { .. })
    }
}

/// The order endpoints the checkout orchestrator depends on.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// `POST /orders`.
    async fn create_order(&self, request: &CreateOrderRequest) -> BackendResult<OrderHandle>;

    /// `POST /orders/verify-payment`.
    async fn verify_payment(&self, receipt: &PaymentReceipt) -> BackendResult<()>;
}

#[async_trait]
impl<B: OrderBackend + ?Sized> OrderBackend for std::sync::Arc<B> {
    async fn create_order(&self, request: &CreateOrderRequest) -> BackendResult<OrderHandle> {
        (**self).create_order(request).await
    }

    async fn verify_payment(&self, receipt: &PaymentReceipt) -> BackendResult<()> {
        (**self).verify_payment(receipt).await
    }
}
