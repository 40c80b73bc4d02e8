//! Keepalive server.
//!
//! Long-running monitor that keeps remotely-hosted database projects
//! alive by pinging each project's keep-alive RPC on a timer, and
//! reports failures to a chat webhook.
//!
//! # Components
//!
//! - **Pipeline**: one fetch → ping-all → notify pass, shared by both
//!   triggers
//! - **Scheduler**: timer-driven trigger (5-minute cadence by default)
//! - **TriggerServer**: on-demand HTTP trigger and metrics endpoint
//! - **WebhookNotifier**: conditional cycle reports to a webhook sink

pub mod config;
pub mod http_server;
pub mod metrics;
pub mod notifier;
pub mod scheduler;
pub mod server;
pub mod types;

pub use config::{Config, ConfigError};
pub use http_server::TriggerServer;
pub use metrics::MetricsRegistry;
pub use notifier::WebhookNotifier;
pub use scheduler::Scheduler;
pub use server::{KeepaliveServer, Pipeline};
pub use types::{NotifyPolicy, ServerConfig};
