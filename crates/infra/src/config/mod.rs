//! Configuration loading and service discovery
//!
//! This module resolves backend base URLs from the environment and loads the
//! client configuration from environment variables and files.

pub mod env;
pub mod loader;
pub mod services;

// Re-export commonly used items
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use loader::{load, load_dotenv, load_from_env, load_from_file, probe_config_paths};
pub use services::{normalize_base_url, ServiceLocator, ServiceUrls};
