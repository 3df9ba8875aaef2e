//! Typed client for the storefront backend.
//!
//! - **Catalog**: product listing with filters, product detail
//! - **Orders**: order creation and payment verification, implementing the
//!   checkout orchestrator's [`OrderBackend`](storefront_commerce::checkout::OrderBackend)
//! - **Tracking**: order lookup by order number
//! - **Admin**: token-authenticated console calls and the payment ledger
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_api::prelude::*;
//!
//! let api = ApiClient::new("http://localhost:8000/api", Duration::from_secs(15), 2)?;
//! let products = api.list_products(&ProductQuery::new().search("kettle")).await?;
//! let order = api.track_order(" ord-1001 ").await?;
//! ```

pub mod admin;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod orders;
pub mod tracking;

use std::time::Duration;

use storefront_commerce::Currency;
use storefront_data::{FetchClient, RetryPolicy};

pub use admin::{AdminSession, AdminStats, OrderUpdate, MIN_PASSWORD_LEN};
pub use catalog::ProductQuery;
pub use error::{ApiError, ApiResult};
pub use ledger::{PaymentFilter, PaymentLedger};

/// Client for the public and admin backend endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: FetchClient,
    currency: Currency,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host/api`).
    ///
    /// `max_retries` applies to reads only.
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> ApiResult<Self> {
        let http = FetchClient::with_timeout(timeout)?
            .with_base_url(base_url)
            .with_default_header("Accept", "application/json")
            .with_retry(RetryPolicy::new(max_retries));
        Ok(Self::from_fetch_client(http))
    }

    /// Wrap an already configured fetch client.
    pub fn from_fetch_client(http: FetchClient) -> Self {
        Self {
            http,
            currency: Currency::default(),
        }
    }

    /// Set the currency backend amounts are expressed in.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn http(&self) -> &FetchClient {
        &self.http
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AdminSession, AdminStats, ApiClient, ApiError, ApiResult, OrderUpdate, PaymentFilter,
        PaymentLedger, ProductQuery,
    };
}
