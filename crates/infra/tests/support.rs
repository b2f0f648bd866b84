use markethub_common::testing::init_test_tracing;
use markethub_common::CredentialStore;
use markethub_domain::{ClientConfig, ExecutionContext};
use markethub_infra::config::MapEnv;
use markethub_infra::{MarketHub, ServiceLocator};
use wiremock::MockServer;

/// A mock backend serving every MarketHub service from one address.
pub struct TestBackend {
    pub server: MockServer,
}

impl TestBackend {
    pub async fn start() -> Self {
        init_test_tracing();
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Environment pointing all four services at the mock server.
    pub fn env(&self, context: ExecutionContext) -> MapEnv {
        let prefix = match context {
            ExecutionContext::Browser => "NEXT_PUBLIC_",
            ExecutionContext::Server => "",
        };
        ["AUTH", "CATALOG", "COMMERCE", "PAYMENT"]
            .into_iter()
            .map(|service| (format!("{prefix}{service}_API_URL"), format!("{}/", self.uri())))
            .collect()
    }

    pub fn hub(&self, context: ExecutionContext) -> (MarketHub, CredentialStore) {
        let credentials = CredentialStore::in_memory(context);
        let locator = ServiceLocator::new(context).with_env(self.env(context));
        let hub = MarketHub::new(ClientConfig::default(), &locator, credentials.clone())
            .expect("hub should build against the mock backend");
        (hub, credentials)
    }
}
