//! Product catalog module.
//!
//! Contains the product shape served by the catalog endpoints and the admin
//! create/update body.

mod product;

pub use product::{Product, ProductInput};
