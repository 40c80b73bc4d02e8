//! Keep-alive ping implementation.

use crate::types::{PingResult, Project};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Path of the keep-alive RPC on every project.
const KEEP_ALIVE_PATH: &str = "/rest/v1/rpc/keep_alive";

/// Performs one liveness check against one project.
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Ping one project. Never fails: transport errors are folded into
    /// the returned result.
    async fn ping(&self, project: &Project) -> PingResult;
}

/// Pinger that POSTs the keep-alive RPC over HTTP.
pub struct HttpPinger {
    client: reqwest::Client,
}

impl HttpPinger {
    /// Create a new HTTP pinger with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a new HTTP pinger reusing an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Pinger for HttpPinger {
    async fn ping(&self, project: &Project) -> PingResult {
        let start = Instant::now();

        let response = self
            .client
            .post(format!("{}{}", project.url, KEEP_ALIVE_PATH))
            .header("apikey", &project.anon_key)
            .bearer_auth(&project.anon_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await;

        match response {
            Ok(response) => {
                let code = response.status().as_u16();
                let success = response.status().is_success();

                // The body must be consumed even though only the status
                // matters, otherwise the connection cannot be reused.
                let _ = response.bytes().await;
                let duration = start.elapsed().as_millis() as u64;

                if success {
                    info!(
                        event = "ping",
                        project = %project.name,
                        status = "up",
                        http_code = code,
                        duration_ms = duration,
                        "Ping succeeded"
                    );
                    PingResult::up(&project.name, code, duration)
                } else {
                    warn!(
                        event = "ping",
                        project = %project.name,
                        status = "down",
                        http_code = code,
                        duration_ms = duration,
                        "Ping returned failure status"
                    );
                    PingResult::down(&project.name, code, duration)
                }
            }
            Err(e) => {
                let duration = start.elapsed().as_millis() as u64;
                error!(
                    event = "ping",
                    project = %project.name,
                    status = "error",
                    error = %e,
                    duration_ms = duration,
                    "Ping failed"
                );
                PingResult::error(&project.name, duration, e.to_string())
            }
        }
    }
}
