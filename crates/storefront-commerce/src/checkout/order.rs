//! Order types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::checkout::ShippingDetails;
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderNumber, PaymentId, PaymentSessionId};
use crate::money::Money;

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    Pending,
    /// Order confirmed.
    Confirmed,
    /// Order packed for dispatch.
    Packed,
    /// Order handed to the courier.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
    /// A status this client does not recognise. Never sent back.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// All statuses, in the order the admin console lists them.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// The tracking timeline shown to customers.
    pub const TIMELINE: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Packed => "Packed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Index on [`TIMELINE`](Self::TIMELINE); `None` for cancelled or
    /// unrecognised orders.
    pub fn timeline_position(&self) -> Option<usize> {
        Self::TIMELINE.iter().position(|s| s == self)
    }

    /// Check if a timeline step has been reached by an order in this status.
    pub fn has_reached(&self, step: OrderStatus) -> bool {
        match (self.timeline_position(), step.timeline_position()) {
            (Some(current), Some(step)) => step <= current,
            _ => false,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CommerceError::UnknownStatus(s.to_string()))
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment not yet confirmed.
    #[default]
    Pending,
    /// Payment captured and verified.
    Paid,
    /// Payment failed.
    Failed,
    /// A status this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(CommerceError::UnknownStatus(s.to_string())),
        }
    }
}

/// Body of `POST /orders`.
///
/// The client sends its raw items and local totals; the backend recomputes
/// the total and its figure is the one charged.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateOrderRequest {
    #[serde(flatten)]
    pub details: ShippingDetails,
    pub items: Vec<CartLineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Identifiers the backend returns after creating an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHandle {
    /// Customer-facing order number.
    pub order_number: OrderNumber,
    /// Total as recomputed by the backend.
    pub total: Money,
    /// Payment session reference; `None` when no gateway is configured.
    pub payment_session_id: Option<PaymentSessionId>,
}

/// A line on a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<String>,
    pub product_name: String,
    #[serde(default)]
    pub image: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// An order as returned by tracking and the admin order list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedOrder {
    /// Backend identifier; only admin calls need it.
    #[serde(default)]
    pub id: Option<OrderId>,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_pincode: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub subtotal: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub shiprocket_order_id: Option<String>,
    #[serde(default, rename = "razorpay_order_id")]
    pub payment_session_id: Option<PaymentSessionId>,
    #[serde(default, rename = "razorpay_payment_id")]
    pub payment_id: Option<PaymentId>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TrackedOrder {
    /// Check if payment has been captured.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Check if a shipment has been created with the courier.
    pub fn has_shipment(&self) -> bool {
        self.shiprocket_order_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// One-line shipping address.
    pub fn address_line(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.shipping_address, self.shipping_city, self.shipping_state, self.shipping_pincode
        )
    }

    /// Creation time formatted for display, or the raw value if unparseable.
    pub fn created_at_display(&self) -> String {
        format_timestamp(&self.created_at)
    }
}

/// Format a backend timestamp (RFC 3339, or ISO 8601 without offset).
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%d %b %Y, %H:%M";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format(DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}
