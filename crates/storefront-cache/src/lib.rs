//! Client-local key-value persistence for the storefront client.
//!
//! Provides a small `KvStore` abstraction standing in for browser-local
//! storage, two backends (`MemoryStore`, `FileStore`) and typed JSON slots.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_cache::{FileStore, Slot};
//!
//! let store = FileStore::open(".storefront")?;
//! let token: Slot<String, _> = Slot::new(&store, "admin_token");
//!
//! token.store(&"eyJhbGciOi...".to_string())?;
//! let current: Option<String> = token.load()?;
//! token.clear()?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{validate_key, KvStore, Slot};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CacheError, FileStore, KvStore, MemoryStore, Slot};
}
