//! CLI configuration management
//!
//! Handles loading and saving CLI-specific configuration.

use anyhow::{Context, Result};
use carespace_sdk::config::{DEVELOPMENT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format override
pub const ENV_FORMAT: &str = "CARESPACE_FORMAT";

/// Verbose logging override
pub const ENV_VERBOSE: &str = "CARESPACE_VERBOSE";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// API base URL
    pub base_url: String,

    /// Bearer credential (API key or access token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEVELOPMENT_BASE_URL.to_string(),
            api_key: None,
            output_format: "table".to_string(),
            verbose: false,
            timeout: 30,
        }
    }
}

impl CliConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults when the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read CLI config file")?;
        toml::from_str(&content).context("Failed to parse CLI config file")
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;
        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Get the configuration file path (`<config dir>/carespace/cli.toml`)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;
        Ok(config_dir.join("carespace").join("cli.toml"))
    }

    /// Copy with the credential hidden, for display
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_deref().map(mask_secret),
            ..self.clone()
        }
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Keep the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Each layer only fills values the layers above it left unset, so apply
/// CLI arguments first and the config file last.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    timeout: Option<u64>,
}

impl ConfigBuilder {
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

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout in seconds (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Fill unset values from the config file at `path` (default location
    /// when `None`). A missing or unreadable file is skipped.
    pub fn with_config_file(self, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => CliConfig::config_path()?,
        };

        match CliConfig::load_from(&path) {
            Ok(config) => Ok(Self {
                base_url: self.base_url.or(Some(config.base_url)),
                api_key: self.api_key.or(config.api_key),
                output_format: self.output_format.or(Some(config.output_format)),
                verbose: self.verbose.or(Some(config.verbose)),
                timeout: self.timeout.or(Some(config.timeout)),
            }),
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
                Ok(self)
            }
        }
    }

    /// Apply environment variable overrides
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

        if self.output_format.is_none() {
            if let Ok(format) = std::env::var(ENV_FORMAT) {
                if Self::validate_output_format(&format).is_ok() {
                    self.output_format = Some(format);
                }
            }
        }

        if self.verbose.is_none() {
            if let Ok(verbose) = std::env::var(ENV_VERBOSE) {
                self.verbose = Some(verbose.to_lowercase() == "true" || verbose == "1");
            }
        }

        if self.timeout.is_none() {
            if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
                if let Ok(timeout) = timeout.parse() {
                    if Self::validate_timeout(timeout).is_ok() {
                        self.timeout = Some(timeout);
                    }
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let base_url = self.base_url.unwrap_or(defaults.base_url);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        Self::validate_url(&base_url)?;
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;

        Ok(CliConfig {
            base_url,
            api_key: self.api_key.filter(|key| !key.is_empty()),
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout,
        })
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("Base URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }

    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            )),
        }
    }

    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [ENV_BASE_URL, ENV_API_KEY, ENV_FORMAT, ENV_VERBOSE, ENV_TIMEOUT] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.base_url, "https://api-dev.carespace.ai");
        assert!(config.api_key.is_none());
        assert_eq!(config.output_format, "table");
        assert!(!config.verbose);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cli.toml");

        let config = CliConfig {
            api_key: Some("secret-key".to_string()),
            output_format: "json".to_string(),
            ..CliConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();

        assert!(CliConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_redacted_hides_credential() {
        let config = CliConfig {
            api_key: Some("sk-live-123456".to_string()),
            ..CliConfig::default()
        };
        assert_eq!(config.redacted().api_key.as_deref(), Some("****3456"));

        let short = CliConfig {
            api_key: Some("abc".to_string()),
            ..CliConfig::default()
        };
        assert_eq!(short.redacted().api_key.as_deref(), Some("****"));
    }

    #[test]
    fn test_builder_validation() {
        assert!(ConfigBuilder::new().with_base_url("").is_err());
        assert!(ConfigBuilder::new()
            .with_base_url("ftp://example.com")
            .is_err());
        assert!(ConfigBuilder::new().with_output_format("xml").is_err());
        assert!(ConfigBuilder::new().with_timeout(0).is_err());
        assert!(ConfigBuilder::new().with_timeout(301).is_err());
        assert!(ConfigBuilder::new().with_timeout(300).is_ok());
    }

    #[test]
    #[serial]
    fn test_builder_with_config_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(
            &path,
            r#"
base_url = "https://file.example.com"
api_key = "file-key"
output_format = "json"
verbose = true
timeout = 45
"#,
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_config_file(Some(&path))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://file.example.com");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
        assert_eq!(config.timeout, 45);
    }

    #[test]
    #[serial]
    fn test_builder_priority_chain() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        CliConfig {
            base_url: "https://file.example.com".to_string(),
            api_key: Some("file-key".to_string()),
            timeout: 45,
            ..CliConfig::default()
        }
        .save_to(&path)
        .unwrap();

        std::env::set_var(ENV_API_KEY, "env-key");
        std::env::set_var(ENV_TIMEOUT, "20");

        let config = ConfigBuilder::new()
            .with_base_url("https://cli.example.com")
            .unwrap()
            .with_env_overrides()
            .with_config_file(Some(&path))
            .unwrap()
            .build()
            .unwrap();

        // CLI argument wins over everything
        assert_eq!(config.base_url, "https://cli.example.com");
        // Env wins over file
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.timeout, 20);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_invalid_env_values_ignored() {
        clear_env();
        std::env::set_var(ENV_TIMEOUT, "invalid");
        std::env::set_var(ENV_FORMAT, "xml");
        std::env::set_var(ENV_BASE_URL, "localhost");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config, CliConfig::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_env_verbose() {
        clear_env();
        std::env::set_var(ENV_VERBOSE, "1");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();
        assert!(config.verbose);

        clear_env();
    }
}
