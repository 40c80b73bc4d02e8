//! Types for the keepalive server.

use keepalive::source::DEFAULT_PROJECTS_URL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPolicy {
    /// Send a report after every cycle
    All,

    /// Send a report only when at least one project is down
    #[default]
    Failures,
}

impl NotifyPolicy {
    /// Parse a policy string; returns None for unrecognized values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(NotifyPolicy::All),
            "failures" => Some(NotifyPolicy::Failures),
            _ => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for the trigger HTTP server
    pub listen_addr: String,

    /// Interval between scheduled cycles
    pub cycle_interval: Duration,

    /// Whether the timer-driven scheduler runs at all
    pub scheduler_enabled: bool,

    /// Request timeout for each ping
    pub probe_timeout: Duration,

    /// Location of the projects list
    pub projects_url: String,

    /// Notification sink, no report is sent when unset
    pub webhook_url: Option<String>,

    /// When to send a report
    pub notify_policy: NotifyPolicy,

    /// Whether the metrics endpoint is exposed
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
            cycle_interval: Duration::from_secs(300),
            scheduler_enabled: true,
            probe_timeout: Duration::from_secs(10),
            projects_url: DEFAULT_PROJECTS_URL.to_string(),
            webhook_url: None,
            notify_policy: NotifyPolicy::Failures,
            metrics_enabled: true,
        }
    }
}
