//! Cart line item.

use crate::catalog::Product;
use crate::ids::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
///
/// Name, price and image are captured when the product is added and are not
/// refreshed from the catalog afterwards. The serialized field names are the
/// persisted cart layout and the item shape sent with `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Product identifier; unique within a cart.
    pub product_id: ProductId,
    /// Product name at add time.
    pub product_name: String,
    /// Unit price, already discount-adjusted at add time.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Quantity, always at least 1.
    pub quantity: i64,
    /// Image URL at add time.
    #[serde(default)]
    pub image: String,
}

impl CartLineItem {
    /// Snapshot a product into a new line item.
    ///
    /// Returns `None` when the product has no usable discounted price.
    pub fn from_product(product: &Product, quantity: i64) -> Option<Self> {
        Some(Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            price: product.discounted_price()?,
            quantity,
            image: product.primary_image().to_string(),
        })
    }

    /// `price × quantity`, unrounded.
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product_snapshots_discounted_price() {
        let mut product = Product::new("P2", "Teapot", Decimal::from(200));
        product.discount = Decimal::from(50);
        product.images = vec!["img.jpg".to_string()];

        let item = CartLineItem::from_product(&product, 2).unwrap();
        assert_eq!(item.price, Decimal::from(100));
        assert_eq!(item.image, "img.jpg");
        assert_eq!(item.line_total(), Decimal::from(200));
    }

    #[test]
    fn test_from_product_rejects_negative_price() {
        let product = Product::new("P3", "Refund", Decimal::from(-10));
        assert!(CartLineItem::from_product(&product, 1).is_none());
    }

    #[test]
    fn test_persisted_layout() {
        let item = CartLineItem {
            product_id: ProductId::new("P1"),
            product_name: "Cup".to_string(),
            price: Decimal::new(4950, 2),
            quantity: 2,
            image: String::new(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["product_id"], "P1");
        assert_eq!(value["product_name"], "Cup");
        assert_eq!(value["price"], 49.5);
        assert_eq!(value["quantity"], 2);
        assert_eq!(value["image"], "");
    }
}
