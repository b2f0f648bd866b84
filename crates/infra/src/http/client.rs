use std::time::Duration;

use markethub_domain::constants::{DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT};
use markethub_domain::{ClientConfig, ExecutionContext, MarketHubError};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with timeout support and a shared cookie jar.
///
/// The cookie jar plays the role of a browser's "include credentials": cookies
/// set by one backend response are sent back on later requests to the same
/// host. Clones share the connection pool and the jar.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, MarketHubError> {
        Self::builder().build()
    }

    /// Client configured from [`ClientConfig`].
    ///
    /// Only the browser context keeps a cookie jar. A server process handles
    /// many callers, so cookies one caller's response sets must never be
    /// replayed for another.
    pub fn from_config(
        config: &ClientConfig,
        context: ExecutionContext,
    ) -> Result<Self, MarketHubError> {
        Self::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .cookie_store(context.is_browser())
            .build()
    }

    /// Default per-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder.
    ///
    /// Any HTTP status is a successful send; interpreting it is up to the
    /// caller. Timeouts surface as [`MarketHubError::Timeout`].
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, MarketHubError> {
        let request = builder.build().map_err(|err| MarketHubError::from(InfraError::from(err)))?;

        let timeout = request.timeout().copied().unwrap_or(self.timeout);
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) if err.is_timeout() => {
                debug!(%method, %url, timeout_ms = timeout.as_millis(), "HTTP request timed out");
                Err(MarketHubError::Timeout(duration_ms(timeout)))
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    cookie_store: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            default_headers: None,
            cookie_store: true,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Keep cookies set by responses and replay them on later requests
    /// (enabled by default).
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, MarketHubError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_store(self.cookie_store)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            MarketHubError::from(infra)
        })?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_non_success_responses_without_interpreting_them() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sends_user_agent_and_default_headers() {
        let server = MockServer::start().await;
        let mut headers = HeaderMap::new();
        headers.insert("x-client", HeaderValue::from_static("storefront"));

        Mock::given(method("GET"))
            .and(header("user-agent", "markethub-test"))
            .and(header("x-client", "storefront"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .user_agent("markethub-test")
            .default_headers(headers)
            .build()
            .expect("http client");
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn replays_cookies_set_by_earlier_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .and(header_exists("cookie"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let login = format!("{}/auth/login", server.uri());
        let orders = format!("{}/v1/orders", server.uri());

        client.send(client.request(Method::POST, &login)).await.expect("login");
        let response = client.send(client.request(Method::GET, &orders)).await.expect("orders");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn server_context_client_keeps_no_cookie_jar() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::from_config(&ClientConfig::default(), ExecutionContext::Server)
            .expect("http client");
        let login = format!("{}/auth/login", server.uri());
        let orders = format!("{}/v1/orders", server.uri());

        client.send(client.request(Method::POST, &login)).await.expect("login");
        client.send(client.request(Method::GET, &orders)).await.expect("orders");

        let requests = server.received_requests().await.expect("recorded requests");
        let replayed = requests.iter().find(|r| r.url.path() == "/v1/orders").expect("orders");
        assert!(replayed.headers.get("cookie").is_none());
    }

    #[tokio::test]
    async fn timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            HttpClient::builder().timeout(Duration::from_millis(50)).build().expect("http client");
        let result = client.send(client.request(Method::GET, server.uri())).await;

        assert_eq!(result.unwrap_err(), MarketHubError::Timeout(50));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::new().expect("http client");
        let result = client.send(client.request(Method::GET, format!("http://{addr}"))).await;

        assert!(matches!(result, Err(MarketHubError::Network(_))), "got {result:?}");
    }
}
