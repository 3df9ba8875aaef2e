//! Shopping cart module.
//!
//! Contains the persisted line item, the cart store, and the summary pushed
//! to cart observers.

mod line_item;
mod pricing;
mod store;

pub use line_item::CartLineItem;
pub use pricing::{items_count, items_total, CartSummary};
pub use store::CartStore;
