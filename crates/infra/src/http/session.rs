//! Session-Refresh Wrapper
//!
//! ```text
//! Sent ──(non-401)──────────────────────────────► Done
//!   │
//!   └─(401)─► Refreshing ──(failure)────────────► Done (original 401)
//!                  │
//!                  └─(success)─► Resent ────────► Done (whatever status)
//! ```
//!
//! Concurrent callers that hit a 401 while a refresh is pending share that
//! refresh instead of starting their own. The pending refresh lives in a
//! [`SingleFlight`] owned by the client, so independent clients never share
//! one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use markethub_common::{CredentialStore, SingleFlight};
use markethub_domain::constants::{AUTH_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT_MS};
use markethub_domain::{Result, TokenResponse};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::json::JsonClient;
use super::request::RequestOptions;

/// Renews the caller's session.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Attempt a refresh. `true` means the session was renewed; failures of
    /// any kind, including transport errors, are `false`.
    async fn refresh(&self) -> bool;
}

/// Refreshes the session with `POST <auth>/auth/refresh`.
///
/// Success is decided by the status alone. If the response also carries an
/// access token and a credential store is attached, the token is stored for
/// later requests.
#[derive(Debug, Clone)]
pub struct HttpSessionRefresher {
    http: HttpClient,
    url: String,
    timeout: Duration,
    credentials: Option<CredentialStore>,
}

impl HttpSessionRefresher {
    #[must_use]
    pub fn new(http: HttpClient, auth_base_url: &str) -> Self {
        Self {
            http,
            url: format!("{auth_base_url}{AUTH_REFRESH_PATH}"),
            timeout: Duration::from_millis(DEFAULT_REFRESH_TIMEOUT_MS),
            credentials: None,
        }
    }

    /// Upper bound for one refresh call; running out counts as a failure.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn store_renewed_token(&self, response: Response) {
        let Some(store) = &self.credentials else {
            return;
        };

        match JsonClient::decode_response::<TokenResponse>(response).await {
            Ok(token) => {
                if let Some(access_token) = token.token() {
                    if let Err(err) = store.set(access_token) {
                        warn!(error = %err, "Failed to store renewed access token");
                    }
                }
            }
            Err(err) => debug!(error = %err, "Refresh response carried no token"),
        }
    }
}

#[async_trait]
impl SessionRefresher for HttpSessionRefresher {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn refresh(&self) -> bool {
        let request = RequestOptions::post().timeout(self.timeout).apply(&self.http, &self.url);

        match self.http.send(request).await {
            Ok(response) if response.status().is_success() => {
                self.store_renewed_token(response).await;
                info!("Session refreshed");
                true
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Session refresh rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed");
                false
            }
        }
    }
}

/// Sends requests that survive one expired session.
#[derive(Clone)]
pub struct SessionClient {
    json: JsonClient,
    refresher: Option<Arc<dyn SessionRefresher>>,
    flight: Arc<SingleFlight<bool>>,
}

impl SessionClient {
    /// Client with its own, unshared refresh registry.
    pub fn new(json: JsonClient, refresher: Arc<dyn SessionRefresher>) -> Self {
        Self { json, refresher: Some(refresher), flight: Arc::new(SingleFlight::new()) }
    }

    /// Client that never refreshes: a 401 is returned to the caller as is.
    ///
    /// Used in the server context, where each request carries its own
    /// caller's forwarded cookies and no session may be renewed or shared
    /// on that caller's behalf.
    #[must_use]
    pub fn without_refresh(json: JsonClient) -> Self {
        Self { json, refresher: None, flight: Arc::new(SingleFlight::new()) }
    }

    /// Whether a 401 triggers a session refresh.
    #[must_use]
    pub const fn refreshes(&self) -> bool {
        self.refresher.is_some()
    }

    /// Share a refresh registry with other clients.
    #[must_use]
    pub fn with_flight(mut self, flight: Arc<SingleFlight<bool>>) -> Self {
        self.flight = flight;
        self
    }

    #[must_use]
    pub const fn json(&self) -> &JsonClient {
        &self.json
    }

    /// Whether a refresh is currently pending.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.flight.is_in_flight()
    }

    /// Send the request; on a 401, refresh the session once and resend.
    ///
    /// Non-401 responses are returned untouched. When the refresh fails the
    /// original 401 response is returned. The resent request is returned
    /// whatever its status.
    ///
    /// # Errors
    /// Only transport failures are errors; HTTP statuses never are.
    #[instrument(skip(self, options), fields(method = %options.method()))]
    pub async fn request_with_auth(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response> {
        let http = self.json.http();
        let response = http.send(options.apply(http, url)).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if !self.refreshes() {
            debug!("Received 401, session refresh disabled");
            return Ok(response);
        }

        debug!("Received 401, refreshing session");
        if !self.refresh_session().await {
            return Ok(response);
        }

        debug!("Session renewed, resending request");
        http.send(options.apply(http, url)).await
    }

    /// Run the refresher, or join the refresh already pending. Always
    /// `false` for a client built with [`SessionClient::without_refresh`].
    pub async fn refresh_session(&self) -> bool {
        let Some(refresher) = self.refresher.clone() else {
            return false;
        };
        self.flight.run(move || async move { refresher.refresh().await }).await
    }

    /// [`SessionClient::request_with_auth`] followed by JSON decoding.
    ///
    /// # Errors
    /// Same as [`JsonClient::request`].
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<T> {
        let response = self.request_with_auth(url, options).await?;
        JsonClient::decode_response(response).await
    }

    /// Like [`SessionClient::send_json`], reporting `fallback` for failures
    /// whose body has no usable message.
    pub(crate) async fn send_json_or<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
        fallback: &str,
    ) -> Result<T> {
        let response = self.request_with_auth(url, options).await?;
        JsonClient::decode_with_fallback(response, Some(fallback)).await
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("json", &self.json)
            .field("refreshes", &self.refreshes())
            .field("flight", &self.flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use markethub_common::testing::init_test_tracing;
    use markethub_domain::ExecutionContext;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn http() -> HttpClient {
        HttpClient::new().expect("http client")
    }

    fn session_for(server: &MockServer) -> SessionClient {
        let refresher = HttpSessionRefresher::new(http(), &server.uri());
        SessionClient::new(JsonClient::new(http()), Arc::new(refresher))
    }

    async fn mount_refresh(server: &MockServer, status: u16, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected)
            .mount(server)
            .await;
    }

    /// `/v1/orders` answers 401 `unauthorized` times, then 200.
    async fn mount_orders(server: &MockServer, unauthorized: u64, expected_total: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })),
            )
            .up_to_n_times(unauthorized)
            .expect(unauthorized.min(expected_total))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .expect(expected_total.saturating_sub(unauthorized))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn non_401_responses_are_returned_without_refresh() {
        let server = MockServer::start().await;
        mount_refresh(&server, 200, 0).await;
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v1/orders", server.uri());
        let response = session_for(&server).request_with_auth(&url, &RequestOptions::get()).await;

        assert_eq!(response.unwrap().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn successful_refresh_resends_the_request_once() {
        init_test_tracing();
        let server = MockServer::start().await;
        mount_refresh(&server, 200, 1).await;
        mount_orders(&server, 1, 2).await;

        let url = format!("{}/v1/orders", server.uri());
        let orders: Value =
            session_for(&server).send_json(&url, &RequestOptions::get()).await.unwrap();

        assert_eq!(orders, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn failed_refresh_returns_the_original_401() {
        let server = MockServer::start().await;
        mount_refresh(&server, 401, 1).await;
        mount_orders(&server, 1, 1).await;

        let url = format!("{}/v1/orders", server.uri());
        let session = session_for(&server);
        let response = session.request_with_auth(&url, &RequestOptions::get()).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let err = JsonClient::decode_response::<Value>(response).await.unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated");
        assert!(err.is_unauthorized());
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn client_without_refresh_returns_the_401_untouched() {
        let server = MockServer::start().await;
        mount_refresh(&server, 200, 0).await;
        mount_orders(&server, 1, 1).await;

        let url = format!("{}/v1/orders", server.uri());
        let session = SessionClient::without_refresh(JsonClient::new(http()));
        let response = session.request_with_auth(&url, &RequestOptions::get()).await.unwrap();

        assert!(!session.refreshes());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let err = JsonClient::decode_response::<Value>(response).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn refresh_session_without_refresher_reports_failure() {
        let session = SessionClient::without_refresh(JsonClient::new(http()));

        assert!(!session.refresh_session().await);
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn resent_request_is_not_retried_again() {
        let server = MockServer::start().await;
        mount_refresh(&server, 200, 1).await;
        mount_orders(&server, 2, 2).await;

        let url = format!("{}/v1/orders", server.uri());
        let response =
            session_for(&server).request_with_auth(&url, &RequestOptions::get()).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn concurrent_401s_share_one_refresh() {
        init_test_tracing();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;
        mount_orders(&server, 2, 4).await;

        let session = session_for(&server);
        let url = format!("{}/v1/orders", server.uri());
        let options = RequestOptions::get();

        let (first, second) = tokio::join!(
            session.request_with_auth(&url, &options),
            session.request_with_auth(&url, &options)
        );

        assert_eq!(first.unwrap().status(), StatusCode::OK);
        assert_eq!(second.unwrap().status(), StatusCode::OK);
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn later_401_starts_a_new_refresh() {
        let server = MockServer::start().await;
        mount_refresh(&server, 500, 2).await;
        mount_orders(&server, 2, 2).await;

        let session = session_for(&server);
        let url = format!("{}/v1/orders", server.uri());

        for _ in 0..2 {
            let response = session.request_with_auth(&url, &RequestOptions::get()).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn hung_refresh_times_out_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let refresher = HttpSessionRefresher::new(http(), &server.uri())
            .with_timeout(Duration::from_millis(50));

        assert!(!refresher.refresh().await);
    }

    #[tokio::test]
    async fn refresh_stores_a_renewed_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "renewed", "token_type": "bearer" })),
            )
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory(ExecutionContext::Browser);
        store.set("stale").unwrap();
        let refresher =
            HttpSessionRefresher::new(http(), &server.uri()).with_credentials(store.clone());

        assert!(refresher.refresh().await);
        assert_eq!(store.get().as_deref(), Some("renewed"));
    }

    struct CountingRefresher {
        calls: AtomicUsize,
        outcome: bool,
    }

    #[async_trait]
    impl SessionRefresher for CountingRefresher {
        async fn refresh(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    #[tokio::test]
    async fn shared_flight_registry_is_used_by_clones() {
        let refresher = Arc::new(CountingRefresher { calls: AtomicUsize::new(0), outcome: true });
        let flight = Arc::new(SingleFlight::new());
        let session = SessionClient::new(JsonClient::new(http()), refresher.clone())
            .with_flight(Arc::clone(&flight));
        let clone = session.clone();

        assert!(session.refresh_session().await);
        assert!(clone.refresh_session().await);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert!(!flight.is_in_flight());
    }
}
