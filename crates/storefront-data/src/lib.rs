//! HTTP client utilities for the storefront client.
//!
//! A thin builder over `reqwest` with a base URL, default headers, a
//! fully-read [`Response`], and automatic retries for idempotent reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_data::FetchClient;
//!
//! let client = FetchClient::new()?
//!     .with_base_url("http://localhost:8000/api");
//!
//! let products: Vec<Product> = client
//!     .get("/products")
//!     .query("limit", 8)
//!     .send_json()
//!     .await?;
//!
//! let handle: OrderHandle = client
//!     .post("/orders")
//!     .json(&request)?
//!     .send_json()
//!     .await?;
//! ```

mod error;
mod request;
mod response;
mod retry;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use error::FetchError;
pub use request::{Body, Method, RequestBuilder};
pub use response::Response;
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for making outbound requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::Client,
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
    retry: RetryPolicy,
}

impl FetchClient {
    /// Create a client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        Ok(Self {
            inner,
            base_url: None,
            default_headers: Vec::new(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client with a base URL that will be prepended to relative paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Set the retry policy applied to idempotent requests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Put, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        };

        let mut builder = RequestBuilder::new(method, full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            client: self,
            builder,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    builder: RequestBuilder,
}

impl<'a> ClientRequestBuilder<'a> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Add a query parameter if the value is present.
    pub fn query_opt(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.builder = self.builder.query_opt(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set the request body as URL-encoded form fields.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.builder = self.builder.form(fields);
        self
    }

    /// Set the request body as multipart form fields.
    pub fn multipart<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.builder = self.builder.multipart(fields);
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// The request as built so far.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and return the response, whatever its status.
    ///
    /// Idempotent requests are retried per the client's [`RetryPolicy`]:
    /// transport failures always, and error statuses the policy names.
    pub async fn send(self) -> Result<Response, FetchError> {
        let retry = if self.builder.method().is_idempotent() {
            self.client.retry.clone()
        } else {
            RetryPolicy::none()
        };

        let mut attempt = 0;
        loop {
            let outcome = self.send_once().await;
            let error = match &outcome {
                Ok(response) if response.is_success() => return outcome,
                Ok(response) => FetchError::HttpError {
                    status: response.status,
                    message: String::new(),
                },
                Err(e) => e.clone(),
            };
            if !retry.should_retry(&error, attempt) {
                return outcome;
            }
            let delay = retry.backoff.delay_for_attempt(attempt);
            warn!(
                method = self.builder.method().as_str(),
                url = self.builder.url(),
                attempt = attempt + 1,
                error = %error,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send the request, fail on non-2xx, and parse the body as JSON.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.error_for_status()?.json()
    }

    async fn send_once(&self) -> Result<Response, FetchError> {
        let request = self.builder.build(&self.client.inner)?;
        debug!(
            method = self.builder.method().as_str(),
            url = self.builder.url(),
            "Sending request"
        );
        let response = self.client.inner.execute(request).await?;
        let response = Response::read(response).await?;
        debug!(status = response.status, url = self.builder.url(), "Received response");
        Ok(response)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, RetryPolicy};
}
