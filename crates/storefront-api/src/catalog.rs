//! Catalog reads.

use rust_decimal::Decimal;
use storefront_commerce::catalog::Product;
use storefront_commerce::ProductId;
use tracing::debug;

use crate::{ApiClient, ApiError, ApiResult};

/// Listing size used by the product browser.
pub const DEFAULT_LIMIT: u32 = 100;

/// Listing size used for the featured products strip.
pub const FEATURED_LIMIT: u32 = 8;

/// Filters for `GET /products`.
///
/// `search`, `min_price` and `limit` are sent to the backend. The backend
/// compares against list price, so `max_price` is applied here instead, to
/// the discounted price the customer actually pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductQuery {
    pub fn new() -> Self {
        Self {
            search: None,
            min_price: None,
            max_price: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// The home page's featured listing.
    pub fn featured() -> Self {
        Self::new().limit(FEATURED_LIMIT)
    }

    /// Filter by search text; blank text clears the filter.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        };
        self
    }

    pub fn min_price(mut self, price: Decimal) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: Decimal) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Apply the filters the backend does not.
    pub fn filter_locally(&self, products: Vec<Product>) -> Vec<Product> {
        match self.max_price {
            Some(max) => products
                .into_iter()
                .filter(|p| p.discounted_price().is_some_and(|price| price <= max))
                .collect(),
            None => products,
        }
    }
}

impl ApiClient {
    /// `GET /products` with filters.
    pub async fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        let products: Vec<Product> = self
            .http
            .get("/products")
            .query("limit", query.limit)
            .query_opt("search", query.search.as_deref())
            .query_opt("min_price", query.min_price)
            .send_json()
            .await?;
        let fetched = products.len();
        let products = query.filter_locally(products);
        debug!(fetched, kept = products.len(), "Listed products");
        Ok(products)
    }

    /// `GET /products/{id}`.
    pub async fn get_product(&self, id: &ProductId) -> ApiResult<Product> {
        let result = self
            .http
            .get(format!("/products/{}", id))
            .send_json()
            .await;
        match result {
            Err(e) if e.status() == Some(404) => Err(ApiError::NotFound(format!("Product {id}"))),
            other => Ok(other?),
        }
    }
}
