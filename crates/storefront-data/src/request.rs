//! HTTP request builder.

use crate::FetchError;
use serde::Serialize;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Check if repeating the request cannot change the outcome.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Method::Get)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Pre-encoded JSON.
    Json(Vec<u8>),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` text fields.
    Multipart(Vec<(String, String)>),
    /// Plain text.
    Text(String),
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Body>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a header, replacing any earlier value for the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter if the value is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the request body as a string.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.body = Some(Body::Json(serde_json::to_vec(value)?));
        Ok(self)
    }

    /// Set the request body as URL-encoded form fields.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(Body::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Set the request body as multipart form fields.
    pub fn multipart<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(Body::Multipart(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Build the reqwest request.
    pub(crate) fn build(&self, client: &reqwest::Client) -> Result<reqwest::Request, FetchError> {
        let mut request = client.request(self.method.to_reqwest(), &self.url);
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        request = match &self.body {
            Some(Body::Json(bytes)) => request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            Some(Body::Form(fields)) => request.form(fields),
            Some(Body::Multipart(fields)) => request.multipart(
                fields
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |form, (k, v)| {
                        form.text(k.clone(), v.clone())
                    }),
            ),
            Some(Body::Text(text)) => request
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(text.clone()),
            None => request,
        };
        Ok(request.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(builder: &RequestBuilder) -> reqwest::Request {
        builder.build(&reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_query_parameters_are_encoded() {
        let builder = RequestBuilder::new(Method::Get, "http://localhost:8000/api/products")
            .query("limit", 100)
            .query("search", "tea pot")
            .query_opt("min_price", None::<u32>);
        let request = build(&builder);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/products?limit=100&search=tea+pot"
        );
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let builder = RequestBuilder::new(Method::Post, "http://localhost/api/orders")
            .json(&serde_json::json!({"total": 10}))
            .unwrap();
        let request = build(&builder);
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(&br#"{"total":10}"#[..])
        );
    }

    #[test]
    fn test_form_body_is_urlencoded() {
        let builder = RequestBuilder::new(Method::Post, "http://localhost/api/admin/change-password")
            .form([("old_password", "a b"), ("new_password", "c&d")]);
        let request = build(&builder);
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(&b"old_password=a+b&new_password=c%26d"[..])
        );
    }

    #[test]
    fn test_multipart_body_sets_boundary() {
        let builder = RequestBuilder::new(Method::Post, "http://localhost/api/admin/change-password")
            .multipart([("old_password", "a"), ("new_password", "b")]);
        assert_eq!(
            builder.body(),
            Some(&Body::Multipart(vec![
                ("old_password".to_string(), "a".to_string()),
                ("new_password".to_string(), "b".to_string()),
            ]))
        );
        let request = build(&builder);
        let content_type = request.headers().get("content-type").unwrap();
        assert!(content_type
            .to_str()
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let builder = RequestBuilder::new(Method::Get, "http://localhost/")
            .header("authorization", "Bearer old")
            .bearer_auth("new");
        assert_eq!(builder.get_header("Authorization"), Some("Bearer new"));
        assert_eq!(builder.headers.len(), 1);
    }

    #[test]
    fn test_only_get_is_idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(!Method::Post.is_idempotent());
        assert!(!Method::Delete.is_idempotent());
    }
}
