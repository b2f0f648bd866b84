//! JSON Client
//!
//! One request, one status check, one decode. Success bodies are parsed as
//! JSON with an empty body read as `{}`. Failures become
//! [`MarketHubError::Request`] whose message comes from the error body's
//! `detail` or `message` string, else `Request failed with status <code>`.
//! A malformed error body never hides the status it came with.

use markethub_domain::{MarketHubError, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::HttpClient;
use super::request::RequestOptions;
use crate::errors::InfraError;

/// Error payload shape shared by the backend services.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

impl ErrorBody {
    fn text(&self) -> Option<&str> {
        as_text(&self.detail).or_else(|| as_text(&self.message))
    }
}

fn as_text(field: &Option<Value>) -> Option<&str> {
    field.as_ref().and_then(Value::as_str)
}

/// Issues requests and decodes JSON responses.
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: HttpClient,
}

impl JsonClient {
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Perform one request and decode the JSON response.
    ///
    /// # Errors
    /// - `MarketHubError::Request` for a non-success status
    /// - `MarketHubError::Decode` when the success body does not match `T`
    /// - `MarketHubError::Network` / `MarketHubError::Timeout` on transport
    ///   failure
    #[instrument(skip(self, options), fields(method = %options.method()))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<T> {
        let response = self.http.send(options.apply(&self.http, url)).await?;
        Self::decode_response(response).await
    }

    /// Check the status of an already received response and decode its body.
    ///
    /// # Errors
    /// See [`JsonClient::request`].
    pub async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        Self::decode_with_fallback(response, None).await
    }

    /// Like [`JsonClient::decode_response`], with a custom message for
    /// failures whose body carries no usable `detail` or `message`.
    pub(crate) async fn decode_with_fallback<T: DeserializeOwned>(
        response: Response,
        fallback: Option<&str>,
    ) -> Result<T> {
        let status = response.status();
        let body =
            response.bytes().await.map_err(|err| MarketHubError::from(InfraError::from(err)))?;

        if !status.is_success() {
            let code = status.as_u16();
            let message = error_message(code, &body)
                .or_else(|| fallback.map(str::to_string))
                .unwrap_or_else(|| generic_message(code));
            debug!(status = code, message = %message, "Request failed");
            return Err(MarketHubError::request(code, message));
        }

        parse_body(&body)
    }
}

fn generic_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// Message carried by an error body, if any.
fn error_message(status: u16, body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(status, error = %err, "Error response body is not JSON");
            return None;
        }
    };

    if !value.is_object() {
        return None;
    }

    serde_json::from_value::<ErrorBody>(value)
        .ok()
        .and_then(|payload| payload.text().map(str::to_string))
}

/// Decode a success body; an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let parsed = if body.is_empty() {
        serde_json::from_value(Value::Object(serde_json::Map::new()))
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|err| InfraError::from(err).into())
}
