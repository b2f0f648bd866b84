//! Conversions from external infrastructure errors into domain errors.

use markethub_domain::MarketHubError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub MarketHubError);

impl From<InfraError> for MarketHubError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MarketHubError> for InfraError {
    fn from(value: MarketHubError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMarketHubError {
    fn into_markethub(self) -> MarketHubError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MarketHubError */
/* -------------------------------------------------------------------------- */

impl IntoMarketHubError for HttpError {
    fn into_markethub(self) -> MarketHubError {
        if self.is_builder() {
            return MarketHubError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return MarketHubError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return MarketHubError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return MarketHubError::Decode(self.to_string());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            return MarketHubError::request(code, format!("Request failed with status {code}"));
        }

        MarketHubError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_markethub())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MarketHubError */
/* -------------------------------------------------------------------------- */

impl IntoMarketHubError for JsonError {
    fn into_markethub(self) -> MarketHubError {
        if self.is_io() {
            return MarketHubError::Internal(format!("JSON I/O failure: {self}"));
        }
        MarketHubError::Decode(self.to_string())
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_markethub())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → MarketHubError */
/* -------------------------------------------------------------------------- */

impl IntoMarketHubError for UrlError {
    fn into_markethub(self) -> MarketHubError {
        MarketHubError::InvalidInput(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_markethub())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
