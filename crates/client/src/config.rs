//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPFRONT_API_BASE_URL` - API root (default: `http://localhost:5000/api`)
//! - `SHOPFRONT_SESSION_FILE` - Where the session is persisted
//!   (default: `~/.shopfront/session.json`)
//! - `SHOPFRONT_TIMEOUT_SECS` - Request timeout in seconds (default: none)
//! - `SHOPFRONT_PUBLIC_PAGES` - Comma-separated pages reachable without a
//!   session (default: `index.html,login.html,register.html`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default API root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Page shown after logout.
pub const DEFAULT_LANDING_PAGE: &str = "index.html";
/// Page unauthenticated visitors are sent to.
pub const DEFAULT_LOGIN_PAGE: &str = "login.html";
/// Pages reachable without a session.
pub const DEFAULT_PUBLIC_PAGES: &[&str] = &["index.html", "login.html", "register.html"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Could not determine home directory for the session file")]
    NoHomeDir,
}

/// Session client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    /// File the session is persisted to
    pub session_file: PathBuf,
    /// Overall request timeout; `None` means no client-side deadline
    pub timeout: Option<Duration>,
    /// Pages that do not require a session
    pub public_pages: Vec<String>,
    /// Redirect target for unauthenticated visits
    pub login_page: String,
    /// Redirect target after logout
    pub landing_page: String,
}

impl ClientConfig {
    /// Build a configuration for the given API root with default settings.
    ///
    /// The session file defaults to `.shopfront/session.json` relative to the
    /// working directory; use [`Self::with_session_file`] to change it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an
    /// absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url("SHOPFRONT_API_BASE_URL", api_base_url)?,
            session_file: PathBuf::from(".shopfront").join("session.json"),
            timeout: None,
            public_pages: DEFAULT_PUBLIC_PAGES.iter().map(ToString::to_string).collect(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
            landing_page: DEFAULT_LANDING_PAGE.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid, or if no
    /// session file is configured and the home directory is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("SHOPFRONT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        config.session_file = match lookup("SHOPFRONT_SESSION_FILE") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file()?,
        };

        if let Some(raw) = lookup("SHOPFRONT_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    "SHOPFRONT_TIMEOUT_SECS".to_string(),
                    "must be greater than zero".to_string(),
                ));
            }
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup("SHOPFRONT_PUBLIC_PAGES") {
            config.public_pages = raw
                .split(',')
                .map(str::trim)
                .filter(|page| !page.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Replace the API root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an
    /// absolute http(s) URL.
    pub fn with_api_base_url(mut self, api_base_url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url("SHOPFRONT_API_BASE_URL", api_base_url)?;
        Ok(self)
    }

    /// Replace the session file location.
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Replace the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint path such as `/cart/add`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_base_url)
        } else {
            format!("{}/{path}", self.api_base_url)
        }
    }

    /// Whether `page` is reachable without a session.
    #[must_use]
    pub fn is_public_page(&self, page: &str) -> bool {
        self.public_pages.iter().any(|public| public == page)
    }
}

/// `~/.shopfront/session.json`
fn default_session_file() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".shopfront").join("session.json"))
}

fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "SHOPFRONT_SESSION_FILE",
            "/tmp/session.json",
        )]))
        .unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.timeout, None);
        assert!(config.is_public_page("login.html"));
        assert!(!config.is_public_page("cart.html"));
        assert_eq!(config.login_page, "login.html");
        assert_eq!(config.landing_page, "index.html");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("https://shop.example.com/api/").unwrap();
        assert_eq!(config.api_base_url, "https://shop.example.com/api");
        assert_eq!(
            config.endpoint("/products/3"),
            "https://shop.example.com/api/products/3"
        );
        assert_eq!(config.endpoint("cart"), "https://shop.example.com/api/cart");
    }

    #[test]
    fn test_with_api_base_url_keeps_other_settings() {
        let config = ClientConfig::new(DEFAULT_API_BASE_URL)
            .unwrap()
            .with_session_file("/tmp/s.json")
            .with_api_base_url("https://shop.example.com/api/")
            .unwrap();
        assert_eq!(config.api_base_url, "https://shop.example.com/api");
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("ftp://example.com/api").is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SHOPFRONT_SESSION_FILE", "s.json"),
            ("SHOPFRONT_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        for bad in ["0", "soon", "-3"] {
            let result = ClientConfig::from_lookup(lookup_from(&[
                ("SHOPFRONT_SESSION_FILE", "s.json"),
                ("SHOPFRONT_TIMEOUT_SECS", bad),
            ]));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "SHOPFRONT_TIMEOUT_SECS"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_public_pages_override() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SHOPFRONT_SESSION_FILE", "s.json"),
            ("SHOPFRONT_PUBLIC_PAGES", "index.html, products.html,,"),
        ]))
        .unwrap();
        assert_eq!(config.public_pages, vec!["index.html", "products.html"]);
    }
}
