//! Auth service client

use markethub_domain::constants::{
    AUTH_LOGIN_PATH, AUTH_LOGOUT_PATH, AUTH_ME_PATH, AUTH_REGISTER_PATH,
};
use markethub_domain::{
    LoginRequest, MarketHubError, RegisterRequest, Result, TokenResponse, UserOut,
};
use serde::de::IgnoredAny;
use tracing::{debug, info, instrument, warn};

use super::context::RequestContext;
use crate::http::{JsonClient, RequestOptions, SessionClient};

/// Registration, login, logout and session inspection.
#[derive(Debug, Clone)]
pub struct AuthApi {
    base_url: String,
    json: JsonClient,
    session: SessionClient,
    context: RequestContext,
}

impl AuthApi {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        session: SessionClient,
        context: RequestContext,
    ) -> Self {
        Self { base_url: base_url.into(), json: session.json().clone(), session, context }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create an account.
    ///
    /// # Errors
    /// Returns `MarketHubError::Request` with the service's message when the
    /// registration is rejected (for example a duplicate email).
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserOut> {
        let options = RequestOptions::post().json(request)?;
        let user: UserOut = self.json.request(&self.url(AUTH_REGISTER_PATH), &options).await?;
        info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    /// Log in and store the issued access token.
    ///
    /// Session cookies set by the service are kept by the HTTP client.
    ///
    /// # Errors
    /// - `MarketHubError::Request` when the credentials are rejected
    /// - `MarketHubError::InvalidInput` when the response has no token
    /// - `MarketHubError::Storage` when the token cannot be stored
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let options = RequestOptions::post().json(&body)?;

        let token: TokenResponse = self.json.request(&self.url(AUTH_LOGIN_PATH), &options).await?;
        let access_token = token.token().ok_or_else(|| {
            MarketHubError::InvalidInput("Login failed. Token is missing.".to_string())
        })?;

        self.context.credentials().set(access_token)?;
        info!(has_token = true, "Logged in");
        Ok(token)
    }

    /// The signed-in user, `None` for guests.
    ///
    /// Without any caller identity no request is made. A rejected session
    /// clears the stored token and reads as a guest.
    ///
    /// # Errors
    /// Transport failures and undecodable responses are returned as errors.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Option<UserOut>> {
        if !self.context.is_identified() {
            debug!("No credentials, skipping session lookup");
            return Ok(None);
        }

        let options = self.context.authorize(RequestOptions::get());
        match self.json.request::<UserOut>(&self.url(AUTH_ME_PATH), &options).await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.status().is_some() => {
                debug!(status = err.status(), "Session rejected, clearing token");
                self.context.credentials().clear()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// End the session. The local token is cleared even if the call fails.
    ///
    /// # Errors
    /// Returns the logout call's error, or a storage error if the token
    /// could not be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let options = self.context.authorize(RequestOptions::post());
        let outcome = self.json.request::<IgnoredAny>(&self.url(AUTH_LOGOUT_PATH), &options).await;

        let cleared = self.context.credentials().clear();
        if let Err(err) = &outcome {
            warn!(error = %err, "Logout call failed; local token cleared anyway");
        }

        outcome?;
        cleared?;
        info!("Logged out");
        Ok(())
    }

    /// Renew the session, sharing any refresh already in progress.
    pub async fn refresh(&self) -> bool {
        self.session.refresh_session().await
    }
}
