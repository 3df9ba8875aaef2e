//! Payment ledger derived from the admin order list.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use storefront_commerce::checkout::{PaymentStatus, TrackedOrder};
use storefront_commerce::CommerceError;

/// Which orders the ledger lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Pending,
    Failed,
}

impl PaymentFilter {
    pub fn matches(self, status: PaymentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Paid => status == PaymentStatus::Paid,
            Self::Pending => status == PaymentStatus::Pending,
            Self::Failed => status == PaymentStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFilter {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(CommerceError::UnknownStatus(other.to_string())),
        }
    }
}

/// Payment totals over a set of orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentLedger {
    orders: Vec<TrackedOrder>,
    pub paid_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
    /// Sum of paid order totals.
    pub total_revenue: Decimal,
    /// Sum of pending order totals.
    pub pending_amount: Decimal,
}

impl PaymentLedger {
    pub fn from_orders(orders: &[TrackedOrder]) -> Self {
        let mut ledger = Self {
            orders: orders.to_vec(),
            ..Self::default()
        };
        for order in orders {
            match order.payment_status {
                PaymentStatus::Paid => {
                    ledger.paid_count += 1;
                    ledger.total_revenue += order.total;
                }
                PaymentStatus::Pending => {
                    ledger.pending_count += 1;
                    ledger.pending_amount += order.total;
                }
                PaymentStatus::Failed => ledger.failed_count += 1,
                PaymentStatus::Unknown => {}
            }
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders matching `filter`, in list order.
    pub fn filter(&self, filter: PaymentFilter) -> impl Iterator<Item = &TrackedOrder> {
        self.orders
            .iter()
            .filter(move |o| filter.matches(o.payment_status))
    }
}
