//! One handle for every backend the storefront talks to

use std::sync::Arc;

use markethub_common::{CredentialStore, FileBackend};
use markethub_domain::{ClientConfig, ExecutionContext, Result};
use tracing::info;

use super::auth::AuthApi;
use super::catalog::CatalogApi;
use super::checkout::CheckoutFlow;
use super::commerce::CommerceApi;
use super::context::RequestContext;
use super::payment::PaymentApi;
use crate::config::{self, ServiceLocator, ServiceUrls};
use crate::http::{HttpClient, HttpSessionRefresher, JsonClient, SessionClient};

/// Facade over the auth, catalog, commerce and payment clients.
///
/// All clients share one HTTP connection pool, one caller identity and one
/// session-refresh registry, so concurrent 401s from different services
/// still trigger a single refresh.
///
/// In the server context the hub keeps no cookie jar and never refreshes:
/// every request carries only the forwarded caller cookies, and a 401 is
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct MarketHub {
    config: ClientConfig,
    urls: ServiceUrls,
    session: SessionClient,
    context: RequestContext,
}

impl MarketHub {
    /// Assemble the clients.
    ///
    /// # Errors
    /// - `MarketHubError::Config` when a service URL cannot be resolved
    /// - `MarketHubError::InvalidInput` when the HTTP client cannot be built
    pub fn new(
        config: ClientConfig,
        locator: &ServiceLocator,
        credentials: CredentialStore,
    ) -> Result<Self> {
        let urls = locator.resolve_all()?;
        let context = locator.context();
        let http = HttpClient::from_config(&config, context)?;

        let session = if context.is_server() {
            SessionClient::without_refresh(JsonClient::new(http))
        } else {
            let refresher = HttpSessionRefresher::new(http.clone(), &urls.auth)
                .with_timeout(config.refresh_timeout())
                .with_credentials(credentials.clone());
            SessionClient::new(JsonClient::new(http), Arc::new(refresher))
        };

        info!(context = ?locator.context(), "MarketHub clients ready");
        Ok(Self { config, urls, session, context: RequestContext::new(credentials) })
    }

    /// Build from `.env`, the config file and the process environment.
    ///
    /// The access token is kept in `credentials_path` when configured and in
    /// memory otherwise.
    ///
    /// # Errors
    /// Same as [`config::load`] and [`MarketHub::new`].
    pub fn from_env(context: ExecutionContext) -> Result<Self> {
        config::load_dotenv();
        let config = config::load()?;
        let locator = ServiceLocator::from_config(&config, context);
        let credentials = default_credentials(&config, context);
        Self::new(config, &locator, credentials)
    }

    /// Forward the incoming request's `Cookie` header (server context).
    #[must_use]
    pub fn with_cookie_header(mut self, cookies: impl Into<String>) -> Self {
        self.context = self.context.with_cookie_header(cookies);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn urls(&self) -> &ServiceUrls {
        &self.urls
    }

    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    #[must_use]
    pub const fn session(&self) -> &SessionClient {
        &self.session
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.urls.auth.as_str(), self.session.clone(), self.context.clone())
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogApi {
        CatalogApi::new(self.urls.catalog.as_str(), self.session.json().clone())
    }

    #[must_use]
    pub fn commerce(&self) -> CommerceApi {
        CommerceApi::new(self.urls.commerce.as_str(), self.session.clone(), self.context.clone())
    }

    #[must_use]
    pub fn payment(&self) -> PaymentApi {
        PaymentApi::new(self.urls.payment.as_str(), self.session.clone(), self.context.clone())
    }

    /// Checkout flow returning buyers to `origin` after payment.
    ///
    /// # Errors
    /// Returns `MarketHubError::InvalidInput` if `origin` is not absolute.
    pub fn checkout(&self, origin: &str) -> Result<CheckoutFlow> {
        CheckoutFlow::new(self.commerce(), self.payment(), origin)
    }
}

fn default_credentials(config: &ClientConfig, context: ExecutionContext) -> CredentialStore {
    match &config.credentials_path {
        Some(path) => CredentialStore::new(context, Arc::new(FileBackend::new(path))),
        None => CredentialStore::in_memory(context),
    }
}

/// Credential store backed by the OS keychain.
#[cfg(feature = "keychain")]
#[must_use]
pub fn keychain_credentials(context: ExecutionContext) -> CredentialStore {
    use markethub_common::KeychainBackend;
    use markethub_domain::constants::KEYCHAIN_SERVICE_NAME;

    CredentialStore::new(context, Arc::new(KeychainBackend::new(KEYCHAIN_SERVICE_NAME)))
}

#[cfg(test)]
mod tests {
    use markethub_domain::{MarketHubError, ServiceName};
    use tempfile::TempDir;

    use super::*;
    use crate::config::MapEnv;

    fn locator(context: ExecutionContext) -> ServiceLocator {
        ServiceLocator::new(context).with_env(
            MapEnv::new()
                .with("NEXT_PUBLIC_AUTH_API_URL", "http://auth.test/")
                .with("NEXT_PUBLIC_CATALOG_API_URL", "http://catalog.test")
                .with("NEXT_PUBLIC_COMMERCE_API_URL", "http://commerce.test")
                .with("NEXT_PUBLIC_PAYMENT_API_URL", "http://payment.test"),
        )
    }

    #[test]
    fn resolves_every_service_up_front() {
        let hub = MarketHub::new(
            ClientConfig::default(),
            &locator(ExecutionContext::Browser),
            CredentialStore::in_memory(ExecutionContext::Browser),
        )
        .unwrap();

        assert_eq!(hub.urls().get(ServiceName::Auth), "http://auth.test");
        assert_eq!(hub.urls().get(ServiceName::Payment), "http://payment.test");
        assert!(hub.checkout("https://shop.test").is_ok());
    }

    #[test]
    fn missing_service_url_fails_construction() {
        let err = MarketHub::new(
            ClientConfig::default(),
            &locator(ExecutionContext::Server),
            CredentialStore::in_memory(ExecutionContext::Server),
        )
        .unwrap_err();

        assert!(matches!(err, MarketHubError::Config(_)));
    }

    #[test]
    fn cookie_header_is_carried_by_every_client() {
        let hub = MarketHub::new(
            ClientConfig::default(),
            &locator(ExecutionContext::Browser),
            CredentialStore::in_memory(ExecutionContext::Browser),
        )
        .unwrap()
        .with_cookie_header("sid=1");

        assert_eq!(hub.context().cookie_header(), Some("sid=1"));
        assert!(hub.context().is_identified());
    }

    #[test]
    fn server_hub_does_not_refresh_sessions() {
        let env = MapEnv::new()
            .with("AUTH_API_URL", "http://auth:8000")
            .with("CATALOG_API_URL", "http://catalog:8000")
            .with("COMMERCE_API_URL", "http://commerce:8000")
            .with("PAYMENT_API_URL", "http://payment:8000");
        let hub = MarketHub::new(
            ClientConfig::default(),
            &ServiceLocator::new(ExecutionContext::Server).with_env(env),
            CredentialStore::in_memory(ExecutionContext::Server),
        )
        .unwrap();

        assert!(!hub.session().refreshes());
    }

    #[test]
    fn browser_hub_refreshes_sessions() {
        let hub = MarketHub::new(
            ClientConfig::default(),
            &locator(ExecutionContext::Browser),
            CredentialStore::in_memory(ExecutionContext::Browser),
        )
        .unwrap();

        assert!(hub.session().refreshes());
    }

    #[test]
    fn configured_credentials_path_uses_file_backend() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig {
            credentials_path: Some(dir.path().join("credentials.json")),
            ..ClientConfig::default()
        };

        default_credentials(&config, ExecutionContext::Browser).set("tok").unwrap();

        let reopened = default_credentials(&config, ExecutionContext::Browser);
        assert_eq!(reopened.get().as_deref(), Some("tok"));
    }
}
