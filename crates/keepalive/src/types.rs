//! Core types for keep-alive probing.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One remote project instance to be kept alive.
///
/// Field names match the JSON shape of the remote projects list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier
    pub name: String,

    /// Informational owner tag
    pub owner: String,

    /// Base URL of the project's REST endpoint
    pub url: String,

    /// Anonymous API key, sent as both apikey and bearer token
    pub anon_key: String,
}

/// Outcome of a single keep-alive ping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingStatus {
    /// Response received with a success status
    Up,
    /// Response received with a failure status
    Down,
    /// No response was obtainable (DNS, connect, timeout, bad URL)
    Error,
}

impl fmt::Display for PingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PingStatus::Up => write!(f, "up"),
            PingStatus::Down => write!(f, "down"),
            PingStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of one ping against one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResult {
    /// Project name
    pub name: String,

    /// Classified outcome
    pub status: PingStatus,

    /// HTTP status code, 0 when no response was obtained
    pub code: u16,

    /// Wall-clock duration of the ping in milliseconds, body drain included
    pub duration: u64,

    /// Error message for transport failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PingResult {
    /// Create an up result
    pub fn up(name: impl Into<String>, code: u16, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: PingStatus::Up,
            code,
            duration: duration_ms,
            error: None,
        }
    }

    /// Create a down result
    pub fn down(name: impl Into<String>, code: u16, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: PingStatus::Down,
            code,
            duration: duration_ms,
            error: None,
        }
    }

    /// Create a transport-error result
    pub fn error(name: impl Into<String>, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: PingStatus::Error,
            code: 0,
            duration: duration_ms,
            error: Some(message.into()),
        }
    }

    /// Check if the result is up
    pub fn is_up(&self) -> bool {
        self.status == PingStatus::Up
    }
}

/// Aggregated outcome of one probe cycle.
///
/// Serialized as the on-demand trigger's response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// RFC 3339 timestamp of cycle completion
    pub timestamp: String,

    /// Number of projects probed
    pub total: usize,

    /// Projects that answered with a success status
    pub up: usize,

    /// Projects that answered with a failure status or not at all
    pub down: usize,

    /// Rounded average ping duration in milliseconds, errored pings included
    pub avg_response_time: u64,

    /// Per-project results, in project iteration order
    pub results: Vec<PingResult>,
}

impl Summary {
    /// Fold ping results into a summary, preserving their order.
    ///
    /// The average is 0 for an empty result set.
    pub fn from_results(results: Vec<PingResult>) -> Self {
        let total = results.len();
        let up = results.iter().filter(|r| r.is_up()).count();
        let down = total - up;

        let avg_response_time = if total == 0 {
            0
        } else {
            let sum: u64 = results.iter().map(|r| r.duration).sum();
            (sum as f64 / total as f64).round() as u64
        };

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total,
            up,
            down,
            avg_response_time,
            results,
        }
    }

    /// Check if any project failed this cycle
    pub fn has_failures(&self) -> bool {
        self.down > 0
    }
}
