//! Cart totals.

use crate::cart::CartLineItem;
use crate::money::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `Σ(price × quantity)` over the items, unrounded.
pub fn items_total(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()))
}

/// `Σ(quantity)` over the items.
pub fn items_count(items: &[CartLineItem]) -> i64 {
    items
        .iter()
        .fold(0_i64, |acc, item| acc.saturating_add(item.quantity))
}

/// What cart observers (badge, drawer) need after every change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CartSummary {
    /// Total units in the cart.
    pub count: i64,
    /// Cart total.
    pub total: Money,
}

impl CartSummary {
    /// Summarize a list of items.
    pub fn from_items(items: &[CartLineItem], currency: Currency) -> Self {
        Self {
            count: items_count(items),
            total: Money::new(items_total(items), currency),
        }
    }

    /// Check if the summary describes an empty cart.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn item(id: &str, price: Decimal, quantity: i64) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            product_name: id.to_string(),
            price,
            quantity,
            image: String::new(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let items = vec![
            item("a", Decimal::new(3333, 2), 3),
            item("b", Decimal::new(1, 2), 1),
        ];
        let summary = CartSummary::from_items(&items, Currency::INR);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total.amount, Decimal::new(10000, 2));
        assert_eq!(summary.total.display_amount(), "100.00");
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::from_items(&[], Currency::INR);
        assert!(summary.is_empty());
        assert!(summary.total.is_zero());
    }
}
