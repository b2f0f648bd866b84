//! HTTP plumbing
//!
//! - [`HttpClient`]: reqwest wrapper with timeout, user agent and cookie jar
//! - [`RequestOptions`]: replayable description of a request
//! - [`JsonClient`]: status check, tolerant JSON decoding, uniform errors
//! - [`JsonClient::collect_all`]: follows `next` links across pages
//! - [`SessionClient`]: retries a 401 once after a single-flight refresh

pub mod client;
pub mod json;
pub mod pagination;
pub mod request;
pub mod session;

pub use client::{HttpClient, HttpClientBuilder};
pub use json::JsonClient;
pub use request::RequestOptions;
pub use session::{HttpSessionRefresher, SessionClient, SessionRefresher};
