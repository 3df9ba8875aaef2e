//! Key-value store abstraction with typed JSON slots.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// A client-local byte store keyed by slot name.
///
/// Implementations must make `set` replace the whole value at once: a reader
/// sees either the previous value or the new one, never a partial write.
pub trait KvStore: Send + Sync {
    /// Read the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// List all keys currently stored.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        (**self).exists(key)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        (**self).exists(key)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
}

/// A single named slot holding one JSON-encoded value.
///
/// # Example
///
/// ```rust,ignore
/// let slot: Slot<Vec<CartLineItem>, _> = Slot::new(store, "cart");
/// slot.store(&items)?;
/// let items = slot.load()?.unwrap_or_default();
/// ```
pub struct Slot<T, S> {
    store: S,
    name: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, S> Slot<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KvStore,
{
    /// Bind a slot name to a store.
    pub fn new(store: S, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _phantom: PhantomData,
        }
    }

    /// The slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying store.
    pub fn store_ref(&self) -> &S {
        &self.store
    }

    /// Load and decode the slot value.
    ///
    /// Returns `Ok(None)` when the slot is empty and
    /// `Err(CacheError::SerializeError)` when the stored bytes do not decode.
    pub fn load(&self) -> Result<Option<T>, CacheError> {
        match self.store.get(&self.name)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode and store a value, replacing the previous one.
    pub fn store(&self, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(&self.name, &bytes)
    }

    /// Empty the slot.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.store.delete(&self.name)
    }

    /// Check if the slot holds a value.
    pub fn is_set(&self) -> Result<bool, CacheError> {
        self.store.exists(&self.name)
    }
}

/// Check a slot name for use as a portable key.
///
/// Accepts non-empty names made of ASCII letters, digits, `_`, `-` and `.`,
/// not starting with a dot.
pub fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}
