//! Admin console calls.
//!
//! The bearer token lives in its own slot, separate from the cart. Admin
//! calls without a token fail before any request is made; a 401 from the
//! backend clears the token.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_cache::{CacheError, KvStore, Slot};
use storefront_commerce::catalog::{Product, ProductInput};
use storefront_commerce::checkout::{OrderStatus, TrackedOrder};
use storefront_commerce::{CommerceError, OrderId, ProductId};
use storefront_data::{ClientRequestBuilder, Response};
use tracing::{info, warn};

use crate::{ApiClient, ApiError, ApiResult};

/// Shortest password the console accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Dashboard figures from `GET /admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub total_products: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
}

/// Body of `PUT /admin/orders/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderUpdate {
    pub order_status: OrderStatus,
    /// Courier tracking number; blank clears it.
    pub tracking_id: String,
}

impl OrderUpdate {
    /// Start from an order's current values.
    pub fn from_order(order: &TrackedOrder) -> Self {
        Self {
            order_status: order.order_status,
            tracking_id: order.tracking_id.clone().unwrap_or_default(),
        }
    }
}

/// An admin console session backed by a token slot.
pub struct AdminSession<S> {
    api: ApiClient,
    token: Slot<String, S>,
}

impl<S: KvStore> AdminSession<S> {
    pub fn new(api: ApiClient, store: S, token_slot: impl Into<String>) -> Self {
        Self {
            api,
            token: Slot::new(store, token_slot),
        }
    }

    /// Check if a token is stored.
    pub fn is_logged_in(&self) -> bool {
        matches!(self.token.load(), Ok(Some(token)) if !token.is_empty())
    }

    /// `POST /admin/login`; stores the returned token.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let response: LoginResponse = self
            .api
            .http
            .post("/admin/login")
            .json(&LoginRequest { username, password })?
            .send_json()
            .await?;
        self.token.store(&response.access_token)?;
        info!(username, "Admin logged in");
        Ok(())
    }

    /// Forget the stored token.
    pub fn logout(&self) -> ApiResult<()> {
        self.token.clear()?;
        info!("Admin logged out");
        Ok(())
    }

    /// `GET /admin/stats`.
    pub async fn stats(&self) -> ApiResult<AdminStats> {
        let request = self.authorize(self.api.http.get("/admin/stats"))?;
        self.send(request).await?.json().map_err(ApiError::from)
    }

    /// `GET /admin/products`.
    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        let request = self.authorize(self.api.http.get("/admin/products"))?;
        self.send(request).await?.json().map_err(ApiError::from)
    }

    /// `POST /admin/products`.
    pub async fn create_product(&self, input: &ProductInput) -> ApiResult<()> {
        input.validate()?;
        let request = self.authorize(self.api.http.post("/admin/products"))?.json(input)?;
        self.send(request).await?;
        info!(name = %input.name, "Product created");
        Ok(())
    }

    /// `PUT /admin/products/{id}`.
    pub async fn update_product(&self, id: &ProductId, input: &ProductInput) -> ApiResult<()> {
        input.validate()?;
        let request = self
            .authorize(self.api.http.put(format!("/admin/products/{id}")))?
            .json(input)?;
        self.send(request).await?;
        info!(product_id = %id, "Product updated");
        Ok(())
    }

    /// `DELETE /admin/products/{id}`.
    pub async fn delete_product(&self, id: &ProductId) -> ApiResult<()> {
        let request = self.authorize(self.api.http.delete(format!("/admin/products/{id}")))?;
        self.send(request).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// `GET /admin/orders`.
    pub async fn list_orders(&self) -> ApiResult<Vec<TrackedOrder>> {
        let request = self.authorize(self.api.http.get("/admin/orders"))?;
        self.send(request).await?.json().map_err(ApiError::from)
    }

    /// Find one order in the admin list by id or order number.
    pub async fn find_order(&self, key: &str) -> ApiResult<TrackedOrder> {
        let wanted = key.trim();
        self.list_orders()
            .await?
            .into_iter()
            .find(|o| {
                o.id.as_ref().is_some_and(|id| id.as_str() == wanted)
                    || o.order_number.as_str().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ApiError::NotFound(format!("Order {wanted}")))
    }

    /// `PUT /admin/orders/{id}`.
    pub async fn update_order(&self, id: &OrderId, update: &OrderUpdate) -> ApiResult<()> {
        if update.order_status == OrderStatus::Unknown {
            return Err(ApiError::Precondition(
                "Choose an order status to set".to_string(),
            ));
        }
        let request = self
            .authorize(self.api.http.put(format!("/admin/orders/{id}")))?
            .json(update)?;
        self.send(request).await?;
        info!(order_id = %id, status = %update.order_status, "Order updated");
        Ok(())
    }

    /// `POST /admin/shiprocket/create-order?order_id=`.
    ///
    /// Only paid orders without a shipment qualify; anything else is refused
    /// locally.
    pub async fn create_shipment(&self, order: &TrackedOrder) -> ApiResult<serde_json::Value> {
        check_shippable(order)?;
        let id = order
            .id
            .as_ref()
            .ok_or_else(|| ApiError::Precondition("Order has no backend id".to_string()))?;
        let request = self
            .authorize(self.api.http.post("/admin/shiprocket/create-order"))?
            .query("order_id", id);
        let response = self.send(request).await?;
        info!(order_number = %order.order_number, "Shipment created");
        if response.bytes().is_empty() {
            Ok(serde_json::Value::Null)
        } else {
            response.json().map_err(ApiError::from)
        }
    }

    /// `POST /admin/change-password` as multipart form fields, after local
    /// checks.
    pub async fn change_password(&self, old: &str, new: &str, confirm: &str) -> ApiResult<()> {
        check_new_password(new, confirm)?;
        let request = self
            .authorize(self.api.http.post("/admin/change-password"))?
            .multipart([("old_password", old), ("new_password", new)]);
        self.send(request).await?;
        info!("Admin password changed");
        Ok(())
    }

    fn bearer(&self) -> ApiResult<String> {
        match self.token.load() {
            Ok(Some(token)) if !token.is_empty() => Ok(token),
            Ok(_) => Err(ApiError::NotLoggedIn),
            Err(CacheError::SerializeError(e)) => {
                warn!(error = %e, "Discarding unreadable admin token");
                self.token.clear()?;
                Err(ApiError::NotLoggedIn)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn authorize<'a>(
        &self,
        request: ClientRequestBuilder<'a>,
    ) -> ApiResult<ClientRequestBuilder<'a>> {
        Ok(request.bearer_auth(self.bearer()?))
    }

    async fn send(&self, request: ClientRequestBuilder<'_>) -> ApiResult<Response> {
        let response = request.send().await?;
        if response.status == 401 {
            warn!("Admin token rejected, clearing session");
            if let Err(e) = self.token.clear() {
                warn!(error = %e, "Could not clear admin token");
            }
            return Err(ApiError::SessionExpired);
        }
        response.error_for_status().map_err(ApiError::from)
    }
}

/// Refuse shipments for unpaid or already shipped orders.
pub fn check_shippable(order: &TrackedOrder) -> ApiResult<()> {
    if !order.is_paid() {
        return Err(ApiError::Precondition(format!(
            "Order {} is not paid",
            order.order_number
        )));
    }
    if order.has_shipment() {
        return Err(ApiError::Precondition(format!(
            "Order {} already has a shipment",
            order.order_number
        )));
    }
    Ok(())
}

/// Local checks before a password change is sent.
pub fn check_new_password(new: &str, confirm: &str) -> Result<(), CommerceError> {
    if new != confirm {
        return Err(CommerceError::ValidationError(
            "New passwords do not match".to_string(),
        ));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(CommerceError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use storefront_cache::MemoryStore;
    use storefront_commerce::checkout::PaymentStatus;

    fn session(store: Arc<MemoryStore>) -> AdminSession<Arc<MemoryStore>> {
        let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(1), 0).unwrap();
        AdminSession::new(api, store, "admin_token")
    }

    fn order(payment: PaymentStatus, shipment: Option<&str>) -> TrackedOrder {
        serde_json::from_value(serde_json::json!({
            "id": "o-1",
            "order_number": "ORD-1",
            "customer_name": "Asha",
            "customer_email": "asha@example.com",
            "customer_phone": "9876543210",
            "shipping_address": "12 MG Road",
            "shipping_city": "Bengaluru",
            "shipping_state": "Karnataka",
            "shipping_pincode": "560001",
            "total": 100,
            "payment_status": payment.as_str(),
            "order_status": "confirmed",
            "shiprocket_order_id": shipment,
            "created_at": "2024-03-05T10:15:00"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_calls_without_token_fail_before_request() {
        let admin = session(Arc::new(MemoryStore::new()));
        assert!(!admin.is_logged_in());
        assert!(matches!(admin.stats().await, Err(ApiError::NotLoggedIn)));
        assert!(matches!(admin.list_orders().await, Err(ApiError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_unreadable_token_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_token", b"not-json").unwrap();
        let admin = session(store.clone());

        assert!(matches!(admin.stats().await, Err(ApiError::NotLoggedIn)));
        assert!(!store.exists("admin_token").unwrap());
    }

    #[test]
    fn test_logout_clears_token_slot() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_token", br#""abc""#).unwrap();
        let admin = session(store.clone());
        assert!(admin.is_logged_in());
        assert_eq!(admin.bearer().unwrap(), "abc");

        admin.logout().unwrap();
        assert!(!admin.is_logged_in());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_token_slot_is_separate_from_cart() {
        let store = Arc::new(MemoryStore::new());
        store.set("cart", b"[]").unwrap();
        store.set("admin_token", br#""abc""#).unwrap();
        session(store.clone()).logout().unwrap();
        assert!(store.exists("cart").unwrap());
    }

    #[test]
    fn test_shipment_preconditions() {
        assert!(check_shippable(&order(PaymentStatus::Paid, None)).is_ok());
        assert!(check_shippable(&order(PaymentStatus::Paid, Some(""))).is_ok());
        assert!(matches!(
            check_shippable(&order(PaymentStatus::Pending, None)),
            Err(ApiError::Precondition(_))
        ));
        assert!(matches!(
            check_shippable(&order(PaymentStatus::Paid, Some("SR-77"))),
            Err(ApiError::Precondition(_))
        ));
    }

    #[test]
    fn test_password_checks() {
        assert!(check_new_password("secret1", "secret1").is_ok());
        assert_eq!(
            check_new_password("secret1", "secret2"),
            Err(CommerceError::ValidationError(
                "New passwords do not match".to_string()
            ))
        );
        assert!(check_new_password("abc", "abc").is_err());
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected_locally() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_token", br#""abc""#).unwrap();
        let admin = session(store);

        let mut input = ProductInput::from(&Product::new("p", "Lamp", Decimal::from(10)));
        input.name.clear();
        assert!(matches!(
            admin.create_product(&input).await,
            Err(ApiError::Commerce(_))
        ));
    }

    #[tokio::test]
    async fn test_unrecognised_status_is_never_sent() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_token", br#""abc""#).unwrap();
        let admin = session(store);

        let mut current = order(PaymentStatus::Paid, None);
        current.order_status = OrderStatus::Unknown;
        let update = OrderUpdate::from_order(&current);
        assert!(matches!(
            admin.update_order(&OrderId::new("o-1"), &update).await,
            Err(ApiError::Precondition(_))
        ));
    }

    #[test]
    fn test_order_update_serializes_lowercase_status() {
        let update = OrderUpdate::from_order(&order(PaymentStatus::Paid, None));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["order_status"], "confirmed");
        assert_eq!(value["tracking_id"], "");
    }
}
