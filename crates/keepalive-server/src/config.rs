//! Configuration loading and validation for the keepalive server.

use crate::types::{NotifyPolicy, ServerConfig};
use keepalive::source::DEFAULT_PROJECTS_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

// Re-export Validate trait for derive macro
#[allow(unused_imports)]
use validator::Validate as _;

/// Environment variables that override the configuration file.
const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
const ENV_NOTIFY_ON: &str = "NOTIFY_ON";
const ENV_PROJECTS_URL: &str = "PROJECTS_URL";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub scheduler: SchedulerSettings,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub notification: NotificationSettings,

    #[serde(default)]
    pub metrics: MetricsSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.scheduler.validate()?;
        self.probe.validate()?;
        self.source.validate()?;
        Ok(())
    }
}

/// Trigger HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1), custom = "validate_listen_addr")]
    pub listen_addr: String,
}

/// Timer-driven scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_cycle_interval")]
    pub interval: Duration,

    pub enabled: bool,
}

/// Per-ping probe settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProbeSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_probe_timeout")]
    pub timeout: Duration,
}

/// Projects list settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceSettings {
    #[validate(length(min = 1))]
    pub projects_url: String,
}

/// Notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub webhook_url: Option<String>,
    pub notify_on: NotifyPolicy,
}

/// Metrics endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

// Default implementations

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            enabled: true,
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            projects_url: DEFAULT_PROJECTS_URL.to_string(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            notify_on: NotifyPolicy::Failures,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            format: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            scheduler: SchedulerSettings::default(),
            probe: ProbeSettings::default(),
            source: SourceSettings::default(),
            notification: NotificationSettings::default(),
            metrics: MetricsSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

// Custom validators

fn validate_listen_addr(addr: &str) -> Result<(), ValidationError> {
    let trimmed = addr.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("listen_addr_empty"));
    }

    // Must look like host:port
    if !trimmed.contains(':') {
        return Err(ValidationError::new("listen_addr_missing_port"));
    }

    Ok(())
}

fn validate_cycle_interval(interval: &Duration) -> Result<(), ValidationError> {
    let secs = interval.as_secs();
    if !(10..=86_400).contains(&secs) {
        return Err(ValidationError::new("cycle_interval_out_of_range"));
    }
    Ok(())
}

fn validate_probe_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let secs = timeout.as_secs();
    if !(1..=120).contains(&secs) {
        return Err(ValidationError::new("probe_timeout_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from default search paths, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)?
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/keepalive/keepalive.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./keepalive.yaml"));

        paths
            .into_iter()
            .find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/keepalive/keepalive.yaml"))
    }

    /// Apply environment variable overrides.
    ///
    /// WEBHOOK_URL, NOTIFY_ON and PROJECTS_URL take precedence over the
    /// configuration file. An unrecognized NOTIFY_ON value falls back to
    /// the failures-only policy.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            if !url.is_empty() {
                self.notification.webhook_url = Some(url);
            }
        }

        if let Ok(policy) = std::env::var(ENV_NOTIFY_ON) {
            match NotifyPolicy::parse(&policy) {
                Some(parsed) => self.notification.notify_on = parsed,
                None => {
                    tracing::warn!(
                        value = %policy,
                        "Unrecognized NOTIFY_ON value, using failures-only policy"
                    );
                    self.notification.notify_on = NotifyPolicy::Failures;
                }
            }
        }

        if let Ok(url) = std::env::var(ENV_PROJECTS_URL) {
            if !url.is_empty() {
                self.source.projects_url = url;
            }
        }
    }

    /// Convert to ServerConfig (internal type consumed by the server)
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.server.listen_addr.clone(),
            cycle_interval: self.scheduler.interval,
            scheduler_enabled: self.scheduler.enabled,
            probe_timeout: self.probe.timeout,
            projects_url: self.source.projects_url.clone(),
            webhook_url: self.notification.webhook_url.clone(),
            notify_policy: self.notification.notify_on,
            metrics_enabled: self.metrics.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_yaml_parsing() {
        let yaml = r#"
server:
  listen_addr: "127.0.0.1:9000"

scheduler:
  interval: 5m
  enabled: true

probe:
  timeout: 10s

notification:
  webhook_url: "https://discord.example/webhook"
  notify_on: all
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.scheduler.interval, Duration::from_secs(300));
        assert_eq!(config.notification.notify_on, NotifyPolicy::All);
        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://discord.example/webhook")
        );
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
server:
  listen_addr: "127.0.0.1:9000"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        // Should use default values
        assert_eq!(config.scheduler.interval, Duration::from_secs(300));
        assert_eq!(config.probe.timeout, Duration::from_secs(10));
        assert_eq!(config.notification.notify_on, NotifyPolicy::Failures);
        assert_eq!(config.source.projects_url, DEFAULT_PROJECTS_URL);
    }

    #[test]
    fn test_invalid_cycle_interval_too_small() {
        let yaml = r#"
scheduler:
  interval: 2s  # Invalid: < 10s
  enabled: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cycle_interval_too_large() {
        let yaml = r#"
scheduler:
  interval: 2days  # Invalid: > 24h
  enabled: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_probe_timeout() {
        let yaml = r#"
probe:
  timeout: 500ms  # Invalid: < 1s
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_addr_validation() {
        assert!(validate_listen_addr("0.0.0.0:8787").is_ok());
        assert!(validate_listen_addr("localhost:80").is_ok());

        assert!(validate_listen_addr("").is_err());
        assert!(validate_listen_addr("   ").is_err());
        assert!(validate_listen_addr("no-port").is_err());
    }

    #[test]
    fn test_humantime_serde_parsing() {
        let yaml = r#"
scheduler:
  interval: 90s
  enabled: false

probe:
  timeout: 2s
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.scheduler.interval, Duration::from_secs(90));
        assert!(!config.scheduler.enabled);
        assert_eq!(config.probe.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_config_to_server_config_conversion() {
        let config = Config::default();
        let server_config = config.to_server_config();

        assert_eq!(server_config.listen_addr, "0.0.0.0:8787");
        assert_eq!(server_config.cycle_interval, Duration::from_secs(300));
        assert_eq!(server_config.probe_timeout, Duration::from_secs(10));
        assert_eq!(server_config.projects_url, DEFAULT_PROJECTS_URL);
        assert!(server_config.webhook_url.is_none());
        assert!(server_config.metrics_enabled);
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        // The only test that touches these variables, so no interference
        // with parallel tests.
        unsafe {
            std::env::set_var(ENV_WEBHOOK_URL, "https://hooks.example/abc");
            std::env::set_var(ENV_NOTIFY_ON, "all");
            std::env::set_var(ENV_PROJECTS_URL, "https://lists.example/projects.json");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://hooks.example/abc")
        );
        assert_eq!(config.notification.notify_on, NotifyPolicy::All);
        assert_eq!(config.source.projects_url, "https://lists.example/projects.json");

        unsafe {
            std::env::set_var(ENV_NOTIFY_ON, "whenever");
        }
        config.apply_env_overrides();
        assert_eq!(config.notification.notify_on, NotifyPolicy::Failures);

        unsafe {
            std::env::remove_var(ENV_WEBHOOK_URL);
            std::env::remove_var(ENV_NOTIFY_ON);
            std::env::remove_var(ENV_PROJECTS_URL);
        }
    }
}
