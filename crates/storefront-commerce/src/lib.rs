//! Storefront domain types and client-side commerce logic.
//!
//! - **Catalog**: products as served by the backend, admin product bodies
//! - **Cart**: the persisted cart store and its observer summary
//! - **Checkout**: shipping form, orders, payment-widget and backend seams,
//!   and the checkout orchestrator
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//!
//! let cart = Arc::new(CartStore::new(store, "cart", Currency::INR));
//! cart.add_item(&product, 2);
//!
//! let (channel, mut events) = PaymentChannel::pair();
//! let mut checkout = CheckoutOrchestrator::new(cart.clone(), backend, widget);
//! let state = checkout.run_to_completion(details, &mut events).await?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Product, ProductInput};

    // Cart
    pub use crate::cart::{CartLineItem, CartStore, CartSummary};

    // Checkout
    pub use crate::checkout::{
        BackendError, CheckoutFailure, CheckoutOrchestrator, CheckoutSnapshot, CheckoutState,
        CreateOrderRequest, EventDisposition, OrderBackend, OrderHandle, OrderItem, OrderStatus,
        PaymentChannel, PaymentEvent, PaymentEvents, PaymentOutcome, PaymentPrefill,
        PaymentReceipt, PaymentRequest, PaymentStatus, PaymentWidget, ShippingDetails,
        TrackedOrder,
    };
}
