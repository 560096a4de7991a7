//! SDK configuration
//!
//! [`ClientConfig`] holds everything the transport needs at construction.
//! [`ClientConfigBuilder`] layers values the same way everywhere:
//! defaults, then environment variables, then explicit builder calls.

use carespace_core::{CarespaceError, Result};
use std::time::Duration;

/// Development API endpoint (the default)
pub const DEVELOPMENT_BASE_URL: &str = "https://api-dev.carespace.ai";

/// Production API endpoint
pub const PRODUCTION_BASE_URL: &str = "https://api.carespace.ai";

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff unit; attempt `n` waits `2^n` units
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Upper bound accepted for the per-attempt timeout
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("carespace-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Environment variable names
pub const ENV_BASE_URL: &str = "CARESPACE_BASE_URL";
pub const ENV_API_KEY: &str = "CARESPACE_API_KEY";
pub const ENV_TIMEOUT: &str = "CARESPACE_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "CARESPACE_MAX_RETRIES";

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = CarespaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(CarespaceError::Config(format!(
                "Unknown environment '{}'. Must be 'development' or 'production'",
                other
            ))),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the API
    pub base_url: String,

    /// Bearer credential installed at construction
    pub api_key: Option<String>,

    /// Per-attempt request timeout
    pub timeout: Duration,

    /// Retries after the first attempt for transport-level failures
    pub max_retries: u32,

    /// Backoff unit between retries
    pub backoff_unit: Duration,

    /// Extra default headers; these override the built-in defaults
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEVELOPMENT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for constructing configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`] with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Environment variables
/// 3. Explicit builder calls
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    backoff_unit: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL (with validation)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Use the base URL of a known deployment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.base_url = Some(environment.base_url().to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set per-attempt timeout (with validation)
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = Some(unit);
        self
    }

    /// Add a default header; a later header with the same name wins
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Apply environment variable overrides
    ///
    /// Only fills values not already set; invalid values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if self.base_url.is_none() {
            if let Ok(url) = std::env::var(ENV_BASE_URL) {
                if Self::validate_url(&url).is_ok() {
                    self.base_url = Some(url);
                }
            }
        }

        if self.api_key.is_none() {
            if let Ok(api_key) = std::env::var(ENV_API_KEY) {
                if !api_key.trim().is_empty() {
                    self.api_key = Some(api_key);
                }
            }
        }

        if self.timeout.is_none() {
            if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
                if let Ok(secs) = timeout.trim().parse::<f64>() {
                    if let Ok(timeout) = Duration::try_from_secs_f64(secs) {
                        if Self::validate_timeout(timeout).is_ok() {
                            self.timeout = Some(timeout);
                        }
                    }
                }
            }
        }

        if self.max_retries.is_none() {
            if let Ok(retries) = std::env::var(ENV_MAX_RETRIES) {
                if let Ok(retries) = retries.trim().parse() {
                    self.max_retries = Some(retries);
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let base_url = self.base_url.unwrap_or(defaults.base_url);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        Self::validate_url(&base_url)?;
        Self::validate_timeout(timeout)?;

        Ok(ClientConfig {
            base_url,
            api_key: self.api_key,
            timeout,
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            backoff_unit: self.backoff_unit.unwrap_or(defaults.backoff_unit),
            headers: self.headers,
        })
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(CarespaceError::Config("Base URL cannot be empty".to_string()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CarespaceError::Config(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_timeout(timeout: Duration) -> Result<()> {
        if timeout.is_zero() {
            return Err(CarespaceError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if timeout > MAX_TIMEOUT {
            return Err(CarespaceError::Config(format!(
                "Timeout must be less than or equal to {} seconds",
                MAX_TIMEOUT.as_secs()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ENV_BASE_URL);
        std::env::remove_var(ENV_API_KEY);
        std::env::remove_var(ENV_TIMEOUT);
        std::env::remove_var(ENV_MAX_RETRIES);
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api-dev.carespace.ai");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(Environment::Production.base_url(), "https://api.carespace.ai");
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_builder_with_custom_values() {
        let config = ClientConfigBuilder::new()
            .with_base_url("https://api.example.com")
            .unwrap()
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(5))
            .unwrap()
            .with_max_retries(1)
            .with_header("X-Request-Source", "tests")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.headers.len(), 1);
    }

    #[test]
    fn test_builder_header_replaces_case_insensitively() {
        let config = ClientConfigBuilder::new()
            .with_header("X-Trace", "a")
            .with_header("x-trace", "b")
            .build()
            .unwrap();
        assert_eq!(config.headers, vec![("x-trace".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_builder_validation() {
        assert!(ClientConfigBuilder::new().with_base_url("").is_err());
        assert!(ClientConfigBuilder::new()
            .with_base_url("ftp://example.com")
            .is_err());
        assert!(ClientConfigBuilder::new()
            .with_timeout(Duration::ZERO)
            .is_err());
        assert!(ClientConfigBuilder::new()
            .with_timeout(Duration::from_secs(301))
            .is_err());
        assert!(ClientConfigBuilder::new()
            .with_timeout(Duration::from_secs(300))
            .is_ok());
    }

    #[test]
    #[serial]
    fn test_builder_with_env_overrides() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://env.example.com");
        std::env::set_var(ENV_API_KEY, "env-key");
        std::env::set_var(ENV_TIMEOUT, "12.5");
        std::env::set_var(ENV_MAX_RETRIES, "5");

        let config = ClientConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.timeout, Duration::from_millis(12_500));
        assert_eq!(config.max_retries, 5);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_priority_chain() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://env.example.com");

        let config = ClientConfigBuilder::new()
            .with_base_url("https://explicit.example.com")
            .unwrap()
            .with_env_overrides()
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://explicit.example.com");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_invalid_env_values_ignored() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "not a url");
        std::env::set_var(ENV_TIMEOUT, "soon");
        std::env::set_var(ENV_MAX_RETRIES, "-1");

        let config = ClientConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config, ClientConfig::default());

        clear_env();
    }
}
