//! API client error types.

use storefront_cache::CacheError;
use storefront_commerce::CommerceError;
use storefront_data::FetchError;
use thiserror::Error;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the backend client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed or the backend answered with an error status.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An admin call was made without a stored token.
    #[error("Not logged in. Run `storefront admin login` first.")]
    NotLoggedIn,

    /// The backend rejected the stored token; it has been cleared.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// The requested resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The action does not apply to the resource in its current state.
    #[error("{0}")]
    Precondition(String),

    /// Local input validation failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// The token slot could not be read or written.
    #[error("Token storage error: {0}")]
    Storage(#[from] CacheError),
}

impl ApiError {
    /// HTTP status of a backend error response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Fetch(e) => e.status(),
            _ => None,
        }
    }
}
