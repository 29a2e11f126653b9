//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BEACHSTALL_API_URL` - REST API base URL (default: <https://beachstall-server.vercel.app/api>)
//! - `BEACHSTALL_ASSET_URL` - Base URL for product images (default: <https://beachstall-server.vercel.app/>)
//! - `BEACHSTALL_TOKEN_FILE` - Where the bearer token is persisted (default: `.beachstall/token`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://beachstall-server.vercel.app/api";
const DEFAULT_ASSET_URL: &str = "https://beachstall-server.vercel.app/";
const DEFAULT_TOKEN_FILE: &str = ".beachstall/token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL, always ending in `/`
    pub api_url: Url,
    /// Base URL that product image paths are resolved against
    pub asset_url: Url,
    /// File holding the persisted bearer token
    pub token_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable is not a valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_base_url(
            "BEACHSTALL_API_URL",
            &get_env_or_default("BEACHSTALL_API_URL", DEFAULT_API_URL),
        )?;
        let asset_url = parse_base_url(
            "BEACHSTALL_ASSET_URL",
            &get_env_or_default("BEACHSTALL_ASSET_URL", DEFAULT_ASSET_URL),
        )?;
        let token_file = PathBuf::from(get_env_or_default("BEACHSTALL_TOKEN_FILE", DEFAULT_TOKEN_FILE));

        Ok(Self {
            api_url,
            asset_url,
            token_file,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at an arbitrary API, with defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not a valid absolute URL.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url("api_url", api_url)?,
            asset_url: parse_base_url("asset_url", DEFAULT_ASSET_URL)?,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a base URL and make sure relative joins append to its path.
///
/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// so `https://host/api` is normalised to `https://host/api/`.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
