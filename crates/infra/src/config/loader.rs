//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables and files.
//!
//! ## Loading Strategy
//! 1. Start from a config file if one is found, otherwise from defaults
//! 2. Overlay any `MARKETHUB_*` environment variables that are set
//! 3. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MARKETHUB_REQUEST_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `MARKETHUB_REFRESH_TIMEOUT_MS`: Session refresh timeout in milliseconds
//! - `MARKETHUB_USER_AGENT`: `User-Agent` header sent with every request
//! - `MARKETHUB_PUBLIC_PREFIX`: Prefix of browser-visible service variables
//! - `MARKETHUB_SERVER_FALLBACK`: Let the server fall back to public service
//!   variables (true/false)
//! - `MARKETHUB_CREDENTIALS_PATH`: File that persists the access token
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./markethub.toml` or `./markethub.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};

use markethub_domain::{ClientConfig, MarketHubError, ResolutionMode, Result};

use super::env::{EnvSource, ProcessEnv};

const ENV_REQUEST_TIMEOUT_MS: &str = "MARKETHUB_REQUEST_TIMEOUT_MS";
const ENV_REFRESH_TIMEOUT_MS: &str = "MARKETHUB_REFRESH_TIMEOUT_MS";
const ENV_USER_AGENT: &str = "MARKETHUB_USER_AGENT";
const ENV_PUBLIC_PREFIX: &str = "MARKETHUB_PUBLIC_PREFIX";
const ENV_SERVER_FALLBACK: &str = "MARKETHUB_SERVER_FALLBACK";
const ENV_CREDENTIALS_PATH: &str = "MARKETHUB_CREDENTIALS_PATH";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["markethub.toml", "markethub.json", "config.toml", "config.json"];

/// Load configuration from the first config file found (if any), then apply
/// environment overrides.
///
/// # Errors
/// Returns `MarketHubError::Config` if a config file exists but is invalid,
/// or an environment variable has an invalid value.
pub fn load() -> Result<ClientConfig> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    let config = apply_env_overrides(base, &ProcessEnv)?;
    tracing::info!(resolution = ?config.resolution, "Client configuration loaded");
    Ok(config)
}

/// Load `.env` from the current directory or its ancestors, if present.
///
/// Variables already set in the process environment win.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(err) => {
            tracing::debug!(error = %err, "No .env file loaded");
            None
        }
    }
}

/// Load configuration from defaults plus environment variables.
///
/// # Errors
/// Returns `MarketHubError::Config` if a variable has an invalid value.
pub fn load_from_env(env: &dyn EnvSource) -> Result<ClientConfig> {
    apply_env_overrides(ClientConfig::default(), env)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Missing keys keep
/// their defaults.
///
/// # Errors
/// Returns `MarketHubError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MarketHubError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MarketHubError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MarketHubError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration; format is detected by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MarketHubError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MarketHubError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MarketHubError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory, then next to the
/// executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn apply_env_overrides(mut config: ClientConfig, env: &dyn EnvSource) -> Result<ClientConfig> {
    if let Some(ms) = env_u64(env, ENV_REQUEST_TIMEOUT_MS)? {
        config.request_timeout_ms = ms;
    }
    if let Some(ms) = env_u64(env, ENV_REFRESH_TIMEOUT_MS)? {
        config.refresh_timeout_ms = ms;
    }
    if let Some(agent) = env_string(env, ENV_USER_AGENT) {
        config.user_agent = agent;
    }
    if let Some(prefix) = env_string(env, ENV_PUBLIC_PREFIX) {
        config.public_prefix = prefix;
    }
    if let Some(fallback) = env_bool(env, ENV_SERVER_FALLBACK) {
        config.resolution =
            if fallback { ResolutionMode::ServerFallback } else { ResolutionMode::Strict };
    }
    if let Some(path) = env_string(env, ENV_CREDENTIALS_PATH) {
        config.credentials_path = Some(PathBuf::from(path));
    }
    Ok(config)
}

/// Non-empty variable value.
fn env_string(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|value| !value.trim().is_empty())
}

fn env_u64(env: &dyn EnvSource, key: &str) -> Result<Option<u64>> {
    env_string(env, key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| MarketHubError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive). Any other value reads as `false`.
fn env_bool(env: &dyn EnvSource, key: &str) -> Option<bool> {
    env_string(env, key)
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
