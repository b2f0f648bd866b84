//! Service Locator
//!
//! Maps a logical [`ServiceName`] to the base URL of its backend. Each
//! service has two variables: a browser-visible public one
//! (`NEXT_PUBLIC_AUTH_API_URL`) and a server-only private one
//! (`AUTH_API_URL`). Which one is read depends on the [`ExecutionContext`]
//! fixed at construction and on the [`ResolutionMode`]:
//!
//! | Context | `Strict`      | `ServerFallback`          |
//! |---------|---------------|---------------------------|
//! | Browser | public        | public                    |
//! | Server  | private       | private, then public      |
//!
//! Empty variables count as unset. Trailing slashes are stripped.

use std::fmt;
use std::sync::Arc;

use markethub_domain::constants::DEFAULT_PUBLIC_ENV_PREFIX;
use markethub_domain::{
    ClientConfig, ExecutionContext, MarketHubError, ResolutionMode, Result, ServiceName,
};
use tracing::debug;

use super::env::{EnvSource, ProcessEnv};

/// Resolves service base URLs from environment variables.
#[derive(Clone)]
pub struct ServiceLocator {
    context: ExecutionContext,
    mode: ResolutionMode,
    public_prefix: String,
    env: Arc<dyn EnvSource>,
}

impl ServiceLocator {
    /// Locator over the process environment in [`ResolutionMode::Strict`].
    #[must_use]
    pub fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            mode: ResolutionMode::Strict,
            public_prefix: DEFAULT_PUBLIC_ENV_PREFIX.to_string(),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Locator configured from the client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig, context: ExecutionContext) -> Self {
        Self::new(context).with_mode(config.resolution).with_public_prefix(&config.public_prefix)
    }

    #[must_use]
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    #[must_use]
    pub const fn context(&self) -> ExecutionContext {
        self.context
    }

    #[must_use]
    pub const fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Variables consulted for `service`, in lookup order.
    #[must_use]
    pub fn env_keys(&self, service: ServiceName) -> Vec<String> {
        match (self.context, self.mode) {
            (ExecutionContext::Browser, _) => vec![service.public_env_key(&self.public_prefix)],
            (ExecutionContext::Server, ResolutionMode::Strict) => vec![service.private_env_key()],
            (ExecutionContext::Server, ResolutionMode::ServerFallback) => {
                vec![service.private_env_key(), service.public_env_key(&self.public_prefix)]
            }
        }
    }

    /// Base URL of `service` without trailing slashes.
    ///
    /// # Errors
    /// Returns `MarketHubError::Config("<KEY> is not set.")` naming the first
    /// consulted variable when none of them holds a value.
    pub fn resolve(&self, service: ServiceName) -> Result<String> {
        let keys = self.env_keys(service);

        for key in &keys {
            let Some(raw) = self.env.var(key).filter(|value| !value.is_empty()) else {
                continue;
            };

            let url = normalize_base_url(&raw).ok_or_else(|| {
                MarketHubError::Config(format!("{key} does not contain a usable URL."))
            })?;
            debug!(service = %service, key = %key, url = %url, "Resolved service base URL");
            return Ok(url);
        }

        let key = keys.first().map_or("", String::as_str);
        Err(MarketHubError::Config(format!("{key} is not set.")))
    }

    /// Resolve every service at once, failing on the first missing one.
    ///
    /// # Errors
    /// Returns the first resolution error, in [`ServiceName::ALL`] order.
    pub fn resolve_all(&self) -> Result<ServiceUrls> {
        Ok(ServiceUrls {
            auth: self.resolve(ServiceName::Auth)?,
            catalog: self.resolve(ServiceName::Catalog)?,
            commerce: self.resolve(ServiceName::Commerce)?,
            payment: self.resolve(ServiceName::Payment)?,
        })
    }
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("context", &self.context)
            .field("mode", &self.mode)
            .field("public_prefix", &self.public_prefix)
            .finish_non_exhaustive()
    }
}

/// Base URLs of every backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    pub auth: String,
    pub catalog: String,
    pub commerce: String,
    pub payment: String,
}

impl ServiceUrls {
    #[must_use]
    pub fn get(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::Auth => &self.auth,
            ServiceName::Catalog => &self.catalog,
            ServiceName::Commerce => &self.commerce,
            ServiceName::Payment => &self.payment,
        }
    }

    /// Join a service base URL with an absolute path.
    #[must_use]
    pub fn endpoint(&self, service: ServiceName, path: &str) -> String {
        format!("{}{path}", self.get(service))
    }
}

/// Strip trailing slashes; `None` when nothing is left.
#[must_use]
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnv;

    fn full_env() -> MapEnv {
        MapEnv::new()
            .with("NEXT_PUBLIC_AUTH_API_URL", "https://auth.example.com/")
            .with("NEXT_PUBLIC_CATALOG_API_URL", "https://catalog.example.com")
            .with("NEXT_PUBLIC_COMMERCE_API_URL", "https://commerce.example.com//")
            .with("NEXT_PUBLIC_PAYMENT_API_URL", "https://payment.example.com")
            .with("AUTH_API_URL", "http://auth:8000/")
            .with("CATALOG_API_URL", "http://catalog:8000")
            .with("COMMERCE_API_URL", "http://commerce:8000")
            .with("PAYMENT_API_URL", "http://payment:8000///")
    }

    #[test]
    fn every_service_resolves_without_trailing_slash_in_both_contexts() {
        for context in [ExecutionContext::Browser, ExecutionContext::Server] {
            let locator = ServiceLocator::new(context).with_env(full_env());
            for service in ServiceName::ALL {
                let url = locator.resolve(service).unwrap();
                assert!(!url.ends_with('/'), "{service} in {context:?} resolved to {url}");
            }
        }
    }

    #[test]
    fn contexts_read_separate_variables() {
        let browser = ServiceLocator::new(ExecutionContext::Browser).with_env(full_env());
        let server = ServiceLocator::new(ExecutionContext::Server).with_env(full_env());

        assert_eq!(browser.resolve(ServiceName::Auth).unwrap(), "https://auth.example.com");
        assert_eq!(server.resolve(ServiceName::Auth).unwrap(), "http://auth:8000");
    }

    #[test]
    fn missing_variable_names_the_key() {
        let env = MapEnv::new().with("AUTH_API_URL", "http://auth:8000");
        let browser = ServiceLocator::new(ExecutionContext::Browser).with_env(env);

        let err = browser.resolve(ServiceName::Auth).unwrap_err();
        assert_eq!(err, MarketHubError::Config("NEXT_PUBLIC_AUTH_API_URL is not set.".into()));
    }

    #[test]
    fn empty_variable_counts_as_unset() {
        let env = MapEnv::new().with("CATALOG_API_URL", "");
        let server = ServiceLocator::new(ExecutionContext::Server).with_env(env);

        let err = server.resolve(ServiceName::Catalog).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: CATALOG_API_URL is not set.");
    }

    #[test]
    fn strict_server_does_not_read_public_keys() {
        let env = MapEnv::new().with("NEXT_PUBLIC_PAYMENT_API_URL", "https://payment.example.com");
        let server = ServiceLocator::new(ExecutionContext::Server).with_env(env);

        assert!(server.resolve(ServiceName::Payment).is_err());
    }

    #[test]
    fn server_fallback_prefers_private_then_public() {
        let env = MapEnv::new()
            .with("AUTH_API_URL", "http://auth:8000")
            .with("NEXT_PUBLIC_AUTH_API_URL", "https://auth.example.com")
            .with("NEXT_PUBLIC_CATALOG_API_URL", "https://catalog.example.com/");
        let server = ServiceLocator::new(ExecutionContext::Server)
            .with_env(env)
            .with_mode(ResolutionMode::ServerFallback);

        assert_eq!(server.resolve(ServiceName::Auth).unwrap(), "http://auth:8000");
        assert_eq!(server.resolve(ServiceName::Catalog).unwrap(), "https://catalog.example.com");
        assert_eq!(
            server.resolve(ServiceName::Commerce).unwrap_err(),
            MarketHubError::Config("COMMERCE_API_URL is not set.".into())
        );
    }

    #[test]
    fn custom_public_prefix() {
        let env = MapEnv::new().with("VITE_AUTH_API_URL", "https://auth.example.com");
        let browser =
            ServiceLocator::new(ExecutionContext::Browser).with_env(env).with_public_prefix("VITE");

        assert_eq!(browser.env_keys(ServiceName::Auth), vec!["VITE_AUTH_API_URL".to_string()]);
        assert!(browser.resolve(ServiceName::Auth).is_ok());
    }

    #[test]
    fn slash_only_value_is_a_config_error() {
        let env = MapEnv::new().with("AUTH_API_URL", "///");
        let server = ServiceLocator::new(ExecutionContext::Server).with_env(env);

        assert!(matches!(server.resolve(ServiceName::Auth), Err(MarketHubError::Config(_))));
    }

    #[test]
    fn resolve_all_collects_every_service() {
        let urls = ServiceLocator::new(ExecutionContext::Server)
            .with_env(full_env())
            .resolve_all()
            .unwrap();

        assert_eq!(urls.payment, "http://payment:8000");
        assert_eq!(
            urls.endpoint(ServiceName::Commerce, "/v1/carts"),
            "http://commerce:8000/v1/carts"
        );
    }
}
