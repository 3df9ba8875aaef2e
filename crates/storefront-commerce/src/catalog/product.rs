//! Product types.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::discounted;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog, as served by `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub description: Option<String>,
    /// List price before discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Discount percentage (0-100).
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    /// Units available.
    #[serde(default)]
    pub stock: i64,
    /// Image URLs, primary first.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Create a product with no discount, stock or images.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            discount: Decimal::ZERO,
            stock: 0,
            images: Vec::new(),
        }
    }

    /// Price after the percentage discount, at full precision.
    ///
    /// The discount is clamped to `0..=100`; `None` means the price itself is
    /// unusable (negative, or too large to discount).
    pub fn discounted_price(&self) -> Option<Decimal> {
        discounted(self.price, self.discount)
    }

    /// Check if the product has a discount.
    pub fn has_discount(&self) -> bool {
        self.discount > Decimal::ZERO
    }

    /// Check if any units are available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// First image URL, or an empty string.
    pub fn primary_image(&self) -> &str {
        self.images.first().map(String::as_str).unwrap_or("")
    }
}

/// Body of the admin product create/update calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    pub stock: i64,
    pub images: Vec<String>,
}

impl ProductInput {
    /// Split newline-separated image URLs, dropping blank lines.
    pub fn parse_images(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check the fields before sending them to the backend.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "Product name is required".to_string(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(CommerceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        if self.discount < Decimal::ZERO || self.discount > Decimal::ONE_HUNDRED {
            return Err(CommerceError::ValidationError(
                "Discount must be between 0 and 100".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(CommerceError::ValidationError(
                "Stock cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            discount: product.discount,
            stock: product.stock,
            images: product.images.clone(),
        }
    }
}
