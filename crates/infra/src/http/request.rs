//! Replayable request descriptions

use std::time::Duration;

use markethub_domain::constants::IDEMPOTENCY_KEY_HEADER;
use markethub_domain::{MarketHubError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;

use super::client::HttpClient;

/// Method, headers, body and timeout of a request, kept separate from the URL.
///
/// Options are plain data, so the same request can be issued again after a
/// session refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    #[must_use]
    pub const fn new(method: Method) -> Self {
        Self { method, headers: Vec::new(), body: None, timeout: None }
    }

    #[must_use]
    pub const fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub const fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub const fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    #[must_use]
    pub const fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Append a header. Later headers with the same name are sent as well.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    /// Returns `MarketHubError::InvalidInput` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|err| {
            MarketHubError::InvalidInput(format!("request body is not serializable: {err}"))
        })?;
        self.body = Some(bytes);
        Ok(self.header(CONTENT_TYPE.as_str(), "application/json"))
    }

    /// Set the `Authorization` header to a prebuilt value such as
    /// `Bearer <token>`. `None` leaves the request anonymous.
    #[must_use]
    pub fn authorization(self, value: Option<String>) -> Self {
        match value {
            Some(value) => self.header(AUTHORIZATION.as_str(), value),
            None => self,
        }
    }

    /// Forward a raw `Cookie` header, as received by a server-side render.
    #[must_use]
    pub fn cookie_header(self, cookies: Option<&str>) -> Self {
        match cookies.filter(|c| !c.is_empty()) {
            Some(cookies) => self.header(COOKIE.as_str(), cookies),
            None => self,
        }
    }

    #[must_use]
    pub fn idempotency_key(self, key: impl Into<String>) -> Self {
        self.header(IDEMPOTENCY_KEY_HEADER, key)
    }

    /// Override the client's default timeout for this request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of header `name` (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Build a reqwest request for `url` on `client`.
    pub(crate) fn apply(&self, client: &HttpClient, url: &str) -> RequestBuilder {
        let mut builder = client.request(self.method.clone(), url);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}
