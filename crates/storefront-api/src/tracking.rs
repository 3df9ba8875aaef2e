//! Order tracking.

use storefront_commerce::checkout::TrackedOrder;
use storefront_commerce::{CommerceError, OrderNumber};

use crate::{ApiClient, ApiError, ApiResult};

impl ApiClient {
    /// `GET /orders/track/{number}`.
    ///
    /// The number is trimmed and upper-cased first; blank input is rejected
    /// without a request.
    pub async fn track_order(&self, raw_number: &str) -> ApiResult<TrackedOrder> {
        let number = OrderNumber::parse_input(raw_number).ok_or_else(|| {
            CommerceError::ValidationError("Please enter an order number".to_string())
        })?;
        let result = self
            .http
            .get(format!("/orders/track/{}", number))
            .send_json()
            .await;
        match result {
            Err(e) if e.status() == Some(404) => Err(ApiError::NotFound(format!("Order {number}"))),
            other => Ok(other?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_blank_number_is_rejected_locally() {
        // Unroutable base URL: reaching the network would fail differently.
        let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(1), 0).unwrap();
        let err = api.track_order("   ").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Commerce(CommerceError::ValidationError(_))
        ));
    }
}
