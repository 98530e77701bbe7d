//! Configuration Management
//!
//! Builds the immutable process-wide configuration once at startup. Values
//! come from (highest precedence first) command-line flags, an optional YAML
//! file, and built-in defaults. The result is shared read-only through `Arc`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Azure Resource Manager endpoint
pub const DEFAULT_BASE_URL: &str = "https://management.azure.com";
/// Azure Active Directory token endpoint host
pub const DEFAULT_AUTH_HOST: &str = "https://login.windows.net";
/// Media type for requests sent upstream
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";
/// User agent sent upstream
pub const DEFAULT_USER_AGENT: &str = "azgate";
/// Default listen address
pub const DEFAULT_LISTEN: &str = "localhost:8080";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Development runs with debug-level logging by default
    pub fn debug_mode(self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Values that may be set in the YAML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub listen: Option<String>,
    #[serde(default)]
    pub env: Option<Environment>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth_host: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl FileConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azgate").join("config.yaml"))
    }

    /// Parse a YAML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load the explicit path if given, otherwise the default path when it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Command-line overrides (all optional; unset means "not given")
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<String>,
    pub env: Option<Environment>,
    pub prefix: Option<String>,
}

/// Immutable gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host and port to listen on
    pub listen: String,
    pub env: Environment,
    /// URL prefix for every resource route
    pub prefix: String,
    /// Upstream ARM base URL (no trailing slash)
    pub base_url: String,
    /// Token endpoint host (no trailing slash)
    pub auth_host: String,
    pub media_type: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            env: Environment::default(),
            prefix: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_host: DEFAULT_AUTH_HOST.to_string(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Resolve effective configuration (CLI > file > default)
    pub fn resolve(file: FileConfig, cli: Overrides) -> Self {
        let defaults = Self::default();
        Self {
            listen: cli.listen.or(file.listen).unwrap_or(defaults.listen),
            env: cli.env.or(file.env).unwrap_or(defaults.env),
            prefix: normalize_prefix(&cli.prefix.or(file.prefix).unwrap_or(defaults.prefix)),
            base_url: trim_base(file.base_url.unwrap_or(defaults.base_url)),
            auth_host: trim_base(file.auth_host.unwrap_or(defaults.auth_host)),
            media_type: file.media_type.unwrap_or(defaults.media_type),
            user_agent: file.user_agent.unwrap_or(defaults.user_agent),
        }
    }

    /// Configuration pointing at a different upstream (used by test harnesses)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url.to_string()),
            auth_host: trim_base(base_url.to_string()),
            ..Self::default()
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Route prefixes are either empty or "/segment" without a trailing slash
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::resolve(FileConfig::default(), Overrides::default());
        assert_eq!(config.listen, "localhost:8080");
        assert_eq!(config.base_url, "https://management.azure.com");
        assert_eq!(config.env, Environment::Development);
        assert!(config.prefix.is_empty());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::from_yaml("listen: 0.0.0.0:9000\nprefix: azure\nenv: production\n")
            .unwrap();
        let cli = Overrides {
            listen: Some("127.0.0.1:7000".to_string()),
            ..Overrides::default()
        };
        let config = Config::resolve(file, cli);
        assert_eq!(config.listen, "127.0.0.1:7000");
        assert_eq!(config.prefix, "/azure");
        assert_eq!(config.env, Environment::Production);
        assert!(!config.env.debug_mode());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let file = FileConfig::from_yaml("base_url: http://localhost:1234/\n").unwrap();
        let config = Config::resolve(file, Overrides::default());
        assert_eq!(config.base_url, "http://localhost:1234");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::from_yaml("bogus: 1\n").is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = FileConfig::from_yaml("").unwrap();
        assert!(file.listen.is_none());
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
