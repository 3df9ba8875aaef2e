//! Newtype IDs for type-safe identifiers.
//!
//! The backend issues every identifier; the client only carries them around,
//! so none of these types can be generated locally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Catalog product identifier; the cart's line-item key.
    ProductId
);
define_id!(
    /// Backend-internal order identifier (admin surface).
    OrderId
);
define_id!(
    /// Customer-facing order number.
    OrderNumber
);
define_id!(
    /// Payment gateway's order/session reference for one checkout attempt.
    PaymentSessionId
);
define_id!(
    /// Payment identifier reported by the widget on success.
    PaymentId
);

impl OrderNumber {
    /// Normalise user input: trims whitespace and upper-cases.
    ///
    /// Returns `None` for blank input.
    pub fn parse_input(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }
}
