//! Toolkit constants
//!
//! Centralized location for the fixed names, paths and defaults shared by the
//! MarketHub crates.

// Credential storage
pub const ACCESS_TOKEN_KEY: &str = "markethub_access_token";
pub const KEYCHAIN_SERVICE_NAME: &str = "MarketHub";

// Service discovery
pub const DEFAULT_PUBLIC_ENV_PREFIX: &str = "NEXT_PUBLIC";
pub const SERVICE_URL_ENV_SUFFIX: &str = "_API_URL";

// Auth service endpoints
pub const AUTH_REGISTER_PATH: &str = "/auth/register";
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";
pub const AUTH_ME_PATH: &str = "/auth/me";
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";

// Catalog service endpoints (trailing slashes are part of the routes)
pub const CATALOG_CATEGORIES_PATH: &str = "/v1/categories/";
pub const CATALOG_PRODUCTS_PATH: &str = "/v1/products/";

// Commerce service endpoints
pub const COMMERCE_CARTS_PATH: &str = "/v1/carts";
pub const COMMERCE_ORDERS_PATH: &str = "/v1/orders";
pub const COMMERCE_CHECKOUTS_PATH: &str = "/v1/checkouts";

// Payment service endpoints
pub const PAYMENT_PAYMENTS_PATH: &str = "/v1/payments";

// HTTP
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
pub const DEFAULT_USER_AGENT: &str = concat!("markethub/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REFRESH_TIMEOUT_MS: u64 = 10_000;

// Accounts
pub const DEFAULT_ACCOUNT_ROLE: &str = "buyer";
