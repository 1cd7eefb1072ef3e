//! Configuration management for nessus-queue.
//!
//! Tunables live in an optional TOML file with XDG-compliant paths and can be
//! overridden from the environment. Scanner credentials are only ever read
//! from the environment (usually populated from `.env`).

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zeroize::Zeroizing;

/// Main application configuration.
///
/// This is loaded from `~/.config/nessus-queue/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scanner REST API settings
    pub api: ApiConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Web console element locators
    pub console: ConsoleConfig,
    /// Poll loop settings
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, using defaults if it is absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `NESSUS_POLL_INTERVAL_SECS`: seconds between status polls
    /// - `NESSUS_LAUNCH_COOLDOWN_SECS`: minimum seconds between two launches
    /// - `NESSUS_HEADLESS`: browser headless mode (true/false)
    /// - `NESSUS_ACCEPT_INVALID_CERTS`: skip TLS verification for both the
    ///   API client and the browser (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secs) = lookup("NESSUS_POLL_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.monitor.poll_interval_secs = secs;
            tracing::debug!("Override monitor.poll_interval_secs from env: {}", secs);
        }

        if let Some(secs) = lookup("NESSUS_LAUNCH_COOLDOWN_SECS").and_then(|v| v.parse().ok()) {
            self.monitor.launch_cooldown_secs = secs;
            tracing::debug!("Override monitor.launch_cooldown_secs from env: {}", secs);
        }

        if let Some(headless) = lookup("NESSUS_HEADLESS").and_then(|v| v.parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        if let Some(accept) = lookup("NESSUS_ACCEPT_INVALID_CERTS").and_then(|v| v.parse().ok()) {
            self.api.accept_invalid_certs = accept;
            self.browser.accept_invalid_certs = accept;
            tracing::debug!("Override accept_invalid_certs from env: {}", accept);
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/nessus-queue/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "nessus-queue", "nessus-queue")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Scanner REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Skip TLS certificate verification (Nessus ships a self-signed cert)
    pub accept_invalid_certs: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Start Chrome with `--ignore-certificate-errors`
    pub accept_invalid_certs: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// How long to wait for a console element to appear, in seconds
    pub element_timeout_secs: u64,
    /// How long to wait for the scan status to read `running` after launch
    pub status_timeout_secs: u64,
    /// Interval between element lookups while waiting, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            accept_invalid_certs: true,
            window_width: 1920,
            window_height: 1080,
            element_timeout_secs: 30,
            status_timeout_secs: 15,
            poll_interval_ms: 250,
        }
    }
}

impl BrowserConfig {
    /// Element wait window.
    #[must_use]
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    /// Post-launch status wait window.
    #[must_use]
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    /// Interval between lookups while waiting.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Locators for the Nessus web console.
///
/// CSS selectors unless the field name says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Username input on the sign-in form
    pub username_selector: String,
    /// Password input on the sign-in form
    pub password_selector: String,
    /// "Remember me" checkbox
    pub remember_me_selector: String,
    /// Sign-in button
    pub sign_in_selector: String,
    /// Launch button on the scan detail view
    pub launch_selector: String,
    /// XPath of the value next to the `Status:` label
    pub status_xpath: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            username_selector: ".login-username".to_string(),
            password_selector: ".login-password".to_string(),
            remember_me_selector: ".login-remember".to_string(),
            sign_in_selector: "button[data-domselect='sign-in']".to_string(),
            launch_selector: "#launch".to_string(),
            status_xpath: "//div[@class='right-column-section']//span[text()='Status:']/following-sibling::span".to_string(),
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between two status polls
    pub poll_interval_secs: u64,
    /// Minimum seconds between two launch attempts for the same scan
    pub launch_cooldown_secs: u64,
    /// Give up on a scan after this many consecutive polls without finding it
    /// (unset = poll forever)
    pub max_not_found_polls: Option<u32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            launch_cooldown_secs: 60,
            max_not_found_polls: None,
        }
    }
}

impl MonitorConfig {
    /// Poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Launch cooldown as a `Duration`.
    #[must_use]
    pub fn launch_cooldown(&self) -> Duration {
        Duration::from_secs(self.launch_cooldown_secs)
    }
}

/// Scanner connection details and console login, read from the environment.
#[derive(Clone)]
pub struct Credentials {
    /// API and console base URL, without trailing slash
    pub base_url: String,
    /// API access key
    pub access_key: Zeroizing<String>,
    /// API secret key
    pub secret_key: Zeroizing<String>,
    /// Web console username
    pub username: Zeroizing<String>,
    /// Web console password
    pub password: Zeroizing<String>,
}

impl Credentials {
    /// Environment variables that must all be set.
    pub const REQUIRED_VARS: [&'static str; 5] = [
        "ACCESS_KEY",
        "SECRET_KEY",
        "NESSUS_BASE_URL",
        "NESSUS_USER",
        "NESSUS_PASS",
    ];

    /// Read credentials from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::Missing` for the first required variable that is
    /// unset or empty, and `ConfigError::InvalidValue` if the base URL does
    /// not parse.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str| -> ConfigResult<Zeroizing<String>> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(Zeroizing::new(value)),
                _ => Err(ConfigError::Missing {
                    var: var.to_string(),
                }),
            }
        };

        // Checked in REQUIRED_VARS order so the operator sees the same first
        // missing variable every run.
        let access_key = require("ACCESS_KEY")?;
        let secret_key = require("SECRET_KEY")?;
        let base_url = require("NESSUS_BASE_URL")?;
        let username = require("NESSUS_USER")?;
        let password = require("NESSUS_PASS")?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
            field: "NESSUS_BASE_URL".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "NESSUS_BASE_URL".to_string(),
                reason: format!("expected an http(s) URL, got scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url,
            access_key,
            secret_key,
            username,
            password,
        })
    }

    /// Value for the `X-ApiKeys` header.
    #[must_use]
    pub fn api_keys_header(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "accessKey={}; secretKey={}",
            self.access_key.as_str(),
            self.secret_key.as_str()
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("username", &self.username.as_str())
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("ACCESS_KEY", "ak".to_string()),
            ("SECRET_KEY", "s3cr3t-key".to_string()),
            ("NESSUS_BASE_URL", "https://nessus.local:8834/".to_string()),
            ("NESSUS_USER", "admin".to_string()),
            ("NESSUS_PASS", "hunter2".to_string()),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.monitor.poll_interval_secs, 5);
        assert_eq!(config.browser.status_timeout_secs, 15);
        assert!(config.api.accept_invalid_certs);
        assert!(config.browser.headless);
        assert!(config.monitor.max_not_found_polls.is_none());
        assert_eq!(config.console.launch_selector, "#launch");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[monitor]
poll_interval_secs = 10
max_not_found_polls = 3

[api]
accept_invalid_certs = false
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.monitor.poll_interval_secs, 10);
        assert_eq!(config.monitor.max_not_found_polls, Some(3));
        assert!(!config.api.accept_invalid_certs);
        // These should be defaults
        assert_eq!(config.monitor.launch_cooldown_secs, 60);
        assert!(config.browser.accept_invalid_certs);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[browser]\nheadless = false\n").expect("write config file");

        let config = AppConfig::load_from(&path).expect("load config");
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let config = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load config");
        assert_eq!(config.monitor.poll_interval_secs, 5);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[monitor\n").expect("write config file");

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            ("NESSUS_POLL_INTERVAL_SECS", "2"),
            ("NESSUS_HEADLESS", "false"),
            ("NESSUS_ACCEPT_INVALID_CERTS", "false"),
            ("NESSUS_LAUNCH_COOLDOWN_SECS", "not-a-number"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.monitor.poll_interval_secs, 2);
        assert!(!config.browser.headless);
        assert!(!config.api.accept_invalid_certs);
        assert!(!config.browser.accept_invalid_certs);
        assert_eq!(config.monitor.launch_cooldown_secs, 60);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let env = full_env();
        let creds =
            Credentials::from_lookup(|key| env.get(key).cloned()).expect("read credentials");

        assert_eq!(creds.base_url, "https://nessus.local:8834");
        assert_eq!(creds.username.as_str(), "admin");
        assert_eq!(
            creds.api_keys_header().as_str(),
            "accessKey=ak; secretKey=s3cr3t-key"
        );
    }

    #[test]
    fn test_credentials_missing_var() {
        let mut env = full_env();
        env.remove("NESSUS_USER");

        let err = Credentials::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref var } if var == "NESSUS_USER"));
    }

    #[test]
    fn test_credentials_empty_var_is_missing() {
        let mut env = full_env();
        env.insert("SECRET_KEY", "  ".to_string());

        let err = Credentials::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref var } if var == "SECRET_KEY"));
    }

    #[test]
    fn test_credentials_invalid_url() {
        let mut env = full_env();
        env.insert("NESSUS_BASE_URL", "not a url".to_string());
        let err = Credentials::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        // Parses as a URL with scheme `nessus.local`, which is not usable.
        env.insert("NESSUS_BASE_URL", "nessus.local:8834".to_string());
        let err = Credentials::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let env = full_env();
        let creds =
            Credentials::from_lookup(|key| env.get(key).cloned()).expect("read credentials");
        let debug = format!("{creds:?}");

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cr3t-key"));
        assert!(debug.contains("<redacted>"));
    }
}
