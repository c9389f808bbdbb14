//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.carlens.toml` files. Provider settings are passed explicitly into
//! the provider constructors; nothing reads configuration globally.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".carlens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Safety ratings / recalls provider.
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Marketplace listings provider.
    #[serde(default)]
    pub listings: ListingsConfig,

    /// Chat-completion insights provider.
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Profile search behaviour.
    #[serde(default)]
    pub search: SearchConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Government safety API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_safety_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            base_url: default_safety_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_safety_url() -> String {
    "https://api.nhtsa.gov".to_string()
}

fn default_timeout() -> u64 {
    6
}

/// Marketplace API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    #[serde(default = "default_listings_url")]
    pub base_url: String,

    /// API key. Usually supplied through `CARLENS_LISTINGS_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_listings_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_listings_url() -> String {
    "https://mc-api.marketcheck.com".to_string()
}

/// Chat-completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// OpenAI-compatible endpoint root (without `/v1`).
    #[serde(default = "default_insights_url")]
    pub base_url: String,

    /// API key. Usually supplied through `CARLENS_INSIGHTS_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds. Kept within `search.call_timeout_seconds`.
    #[serde(default = "default_insights_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            base_url: default_insights_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_insights_timeout(),
        }
    }
}

fn default_insights_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_tokens() -> u32 {
    700
}

fn default_insights_timeout() -> u64 {
    8
}

/// Profile search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Listings per profile page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Radius used when a zip is given without a radius.
    #[serde(default = "default_radius")]
    pub default_radius_miles: u32,

    /// Radii tried, in order, when the initial local search is empty.
    #[serde(default = "default_fallback_radii")]
    pub fallback_radii: Vec<u32>,

    /// Upper bound on any single provider call made by the aggregator.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_radius_miles: default_radius(),
            fallback_radii: default_fallback_radii(),
            call_timeout_seconds: default_call_timeout(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_radius() -> u32 {
    50
}

fn default_fallback_radii() -> Vec<u32> {
    vec![50, 100, 200]
}

fn default_call_timeout() -> u64 {
    8
}

impl SearchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.carlens.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their env vars) take precedence over config file
    /// settings, but only when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref key) = args.listings_api_key {
            self.listings.api_key = Some(key.clone());
        }
        if let Some(ref url) = args.listings_url {
            self.listings.base_url = url.clone();
        }

        if let Some(ref key) = args.insights_api_key {
            self.insights.api_key = Some(key.clone());
        }
        if let Some(ref url) = args.insights_url {
            self.insights.base_url = url.clone();
        }
        if let Some(ref model) = args.model {
            self.insights.model = model.clone();
        }

        if let Some(timeout) = args.timeout {
            self.safety.timeout_seconds = timeout;
            self.listings.timeout_seconds = timeout;
            self.insights.timeout_seconds = timeout;
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.search.page_size == 0 || self.search.page_size > 50 {
            anyhow::bail!("search.page_size must be between 1 and 50");
        }
        if self.search.default_radius_miles == 0 {
            anyhow::bail!("search.default_radius_miles must be positive");
        }
        if self.search.fallback_radii.iter().any(|r| *r == 0) {
            anyhow::bail!("search.fallback_radii must contain positive radii");
        }
        if self.search.call_timeout_seconds == 0 {
            anyhow::bail!("search.call_timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.search.page_size, 10);
        assert_eq!(config.search.fallback_radii, vec![50, 100, 200]);
        assert_eq!(config.search.call_timeout(), Duration::from_secs(8));
        assert!(config.insights.timeout_seconds <= config.search.call_timeout_seconds);
        assert!(config.listings.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
port = 8080

[listings]
api_key = "mc-key"

[insights]
model = "llama3.1"
temperature = 0.2

[search]
fallback_radii = [75, 150]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.listings.api_key.as_deref(), Some("mc-key"));
        assert_eq!(config.insights.model, "llama3.1");
        assert_eq!(config.insights.temperature, 0.2);
        assert_eq!(config.search.fallback_radii, vec![75, 150]);
        assert_eq!(config.search.page_size, 10);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        writeln!(file, "[search]\npage_size = 20").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.search.page_size, 20);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[search\npage_size = ").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_merge_only_overrides_given_args() {
        let mut config = Config::default();
        config.listings.api_key = Some("from-file".to_string());

        let args = crate::cli::Args::parse_from(["carlens", "--port", "9000", "--timeout", "3"]);
        config.merge_with_args(&args);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.listings.timeout_seconds, 3);
        assert_eq!(config.insights.timeout_seconds, 3);
        assert_eq!(config.listings.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate_rejects_zero_radius() {
        let mut config = Config::default();
        config.search.fallback_radii = vec![0, 100];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[listings]"));
        assert!(toml_str.contains("[search]"));
    }
}
