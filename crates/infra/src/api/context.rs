//! Per-request caller identity

use markethub_common::CredentialStore;
use markethub_domain::ExecutionContext;

use crate::http::RequestOptions;

/// Who a request is made on behalf of.
///
/// In the browser context this is the stored access token. In the server
/// context the store is inert and the caller's own `Cookie` header, as
/// received by the server, is forwarded instead.
#[derive(Debug, Clone)]
pub struct RequestContext {
    credentials: CredentialStore,
    cookie_header: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub const fn new(credentials: CredentialStore) -> Self {
        Self { credentials, cookie_header: None }
    }

    /// Forward `cookies` on every authenticated request.
    #[must_use]
    pub fn with_cookie_header(mut self, cookies: impl Into<String>) -> Self {
        self.cookie_header = Some(cookies.into()).filter(|c| !c.is_empty());
        self
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    #[must_use]
    pub const fn execution_context(&self) -> ExecutionContext {
        self.credentials.context()
    }

    /// Whether requests carry any caller identity at all.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        self.cookie_header.is_some() || self.credentials.has_token()
    }

    /// Attach the bearer token and forwarded cookies to `options`.
    #[must_use]
    pub fn authorize(&self, options: RequestOptions) -> RequestOptions {
        options
            .authorization(self.credentials.auth_header())
            .cookie_header(self.cookie_header.as_deref())
    }
}
