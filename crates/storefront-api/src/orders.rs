//! Order creation and payment verification.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_commerce::checkout::{
    BackendError, BackendResult, CreateOrderRequest, OrderBackend, OrderHandle, PaymentReceipt,
};
use storefront_commerce::{Currency, Money, OrderNumber, PaymentSessionId};
use storefront_data::{FetchError, Response};
use tracing::debug;

use crate::ApiClient;

/// `POST /orders` response body.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CreateOrderResponse {
    pub order_number: OrderNumber,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
}

impl CreateOrderResponse {
    /// Convert to a handle; a blank session id means no gateway.
    pub fn into_handle(self, currency: Currency) -> OrderHandle {
        OrderHandle {
            order_number: self.order_number,
            total: Money::new(self.total, currency),
            payment_session_id: self
                .razorpay_order_id
                .filter(|id| !id.trim().is_empty())
                .map(PaymentSessionId::new),
        }
    }
}

/// `POST /orders/verify-payment` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyPaymentRequest<'a> {
    pub razorpay_order_id: &'a str,
    pub razorpay_payment_id: &'a str,
    pub razorpay_signature: &'a str,
}

impl<'a> From<&'a PaymentReceipt> for VerifyPaymentRequest<'a> {
    fn from(receipt: &'a PaymentReceipt) -> Self {
        Self {
            razorpay_order_id: receipt.order_session_id.as_str(),
            razorpay_payment_id: receipt.payment_id.as_str(),
            razorpay_signature: &receipt.signature,
        }
    }
}

/// Classify a failed call for the checkout orchestrator.
pub fn backend_error(error: FetchError) -> BackendError {
    match error {
        FetchError::HttpError { status, message } if (400..500).contains(&status) => {
            BackendError::Rejected { status, message }
        }
        FetchError::HttpError { status, message } => BackendError::Server { status, message },
        FetchError::ParseError(e) | FetchError::JsonError(e) => BackendError::Decode(e),
        other => BackendError::Network(other.to_string()),
    }
}

fn checked(response: Result<Response, FetchError>) -> BackendResult<Response> {
    response
        .and_then(Response::error_for_status)
        .map_err(backend_error)
}

#[async_trait]
impl OrderBackend for ApiClient {
    async fn create_order(&self, request: &CreateOrderRequest) -> BackendResult<OrderHandle> {
        let builder = self
            .http
            .post("/orders")
            .json(request)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let response = checked(builder.send().await)?;
        let body: CreateOrderResponse = response.json().map_err(backend_error)?;
        debug!(order_number = %body.order_number, "Order accepted by backend");
        Ok(body.into_handle(self.currency))
    }

    async fn verify_payment(&self, receipt: &PaymentReceipt) -> BackendResult<()> {
        let builder = self
            .http
            .post("/orders/verify-payment")
            .json(&VerifyPaymentRequest::from(receipt))
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        checked(builder.send().await)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_commerce::PaymentId;

    #[test]
    fn test_response_with_session() {
        let body: CreateOrderResponse = serde_json::from_str(
            r#"{"order_number": "ORD-1001", "total": 349.5, "razorpay_order_id": "order_Nx1"}"#,
        )
        .unwrap();
        let handle = body.into_handle(Currency::INR);
        assert_eq!(handle.order_number.as_str(), "ORD-1001");
        assert_eq!(handle.total.minor_units(), Some(34950));
        assert_eq!(
            handle.payment_session_id,
            Some(PaymentSessionId::new("order_Nx1"))
        );
    }

    #[test]
    fn test_missing_or_blank_session_means_no_gateway() {
        for json in [
            r#"{"order_number": "ORD-1", "total": 10}"#,
            r#"{"order_number": "ORD-1", "total": 10, "razorpay_order_id": null}"#,
            r#"{"order_number": "ORD-1", "total": 10, "razorpay_order_id": ""}"#,
        ] {
            let body: CreateOrderResponse = serde_json::from_str(json).unwrap();
            assert!(body.into_handle(Currency::INR).payment_session_id.is_none());
        }
    }

    #[test]
    fn test_verify_body_field_names() {
        let receipt = PaymentReceipt {
            order_session_id: PaymentSessionId::new("order_1"),
            payment_id: PaymentId::new("pay_1"),
            signature: "abc".to_string(),
        };
        let value = serde_json::to_value(VerifyPaymentRequest::from(&receipt)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "razorpay_order_id": "order_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": "abc"
            })
        );
    }

    #[test]
    fn test_backend_error_classification() {
        let rejected = backend_error(FetchError::HttpError {
            status: 400,
            message: "Insufficient stock".to_string(),
        });
        assert_eq!(
            rejected,
            BackendError::Rejected {
                status: 400,
                message: "Insufficient stock".to_string()
            }
        );
        assert!(matches!(
            backend_error(FetchError::HttpError {
                status: 502,
                message: String::new()
            }),
            BackendError::Server { status: 502, .. }
        ));
        assert!(matches!(
            backend_error(FetchError::Timeout),
            BackendError::Network(_)
        ));
        assert!(matches!(
            backend_error(FetchError::ParseError("eof".into())),
            BackendError::Decode(_)
        ));
    }
}
