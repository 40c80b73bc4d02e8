//! Webhook notification for cycle summaries.

use crate::types::NotifyPolicy;
use keepalive::types::Summary;
use serde::Serialize;
use tracing::{error, info};

/// Embed color when every project is up (RGB)
const COLOR_ALL_UP: u32 = 0x00ff00;

/// Embed color when at least one project is down (RGB)
const COLOR_FAILURES: u32 = 0xff0000;

/// Discord-compatible webhook payload
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

/// One report embed
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

/// One field within an embed
#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Embed footer, carries the cycle timestamp
#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Sends cycle reports to a configured webhook.
///
/// Send failures are logged and absorbed; they never affect the cycle
/// outcome.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    policy: NotifyPolicy,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(
        client: reqwest::Client,
        webhook_url: Option<String>,
        policy: NotifyPolicy,
    ) -> Self {
        Self {
            client,
            webhook_url,
            policy,
        }
    }

    /// Decide whether a summary warrants a report
    pub fn should_notify(&self, summary: &Summary) -> bool {
        if self.webhook_url.is_none() {
            return false;
        }

        match self.policy {
            NotifyPolicy::All => true,
            NotifyPolicy::Failures => summary.has_failures(),
        }
    }

    /// Build the report payload for a summary
    pub fn build_payload(summary: &Summary) -> WebhookPayload {
        let (marker, color) = if summary.has_failures() {
            ("🚨", COLOR_FAILURES)
        } else {
            ("✅", COLOR_ALL_UP)
        };

        let mut fields = vec![
            EmbedField {
                name: "Total".to_string(),
                value: summary.total.to_string(),
                inline: true,
            },
            EmbedField {
                name: "Up".to_string(),
                value: format!("{} ✅", summary.up),
                inline: true,
            },
            EmbedField {
                name: "Down".to_string(),
                value: format!("{} ❌", summary.down),
                inline: true,
            },
            EmbedField {
                name: "Avg Response".to_string(),
                value: format!("{}ms", summary.avg_response_time),
                inline: true,
            },
        ];

        let failed: Vec<String> = summary
            .results
            .iter()
            .filter(|r| !r.is_up())
            .map(|r| {
                let reason = r
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("HTTP {}", r.code));
                format!("• {}: {}", r.name, reason)
            })
            .collect();

        if !failed.is_empty() {
            fields.push(EmbedField {
                name: "Failed Projects".to_string(),
                value: failed.join("\n"),
                inline: false,
            });
        }

        WebhookPayload {
            embeds: vec![Embed {
                title: format!("{marker} Keep-Alive Report"),
                color,
                fields,
                footer: EmbedFooter {
                    text: summary.timestamp.clone(),
                },
            }],
        }
    }

    /// Send the report if the policy and configuration call for it.
    ///
    /// Awaited by the pipeline so the cycle is not considered complete
    /// while the report is still in flight.
    pub async fn notify(&self, summary: &Summary) {
        if !self.should_notify(summary) {
            return;
        }

        let Some(url) = self.webhook_url.as_deref() else {
            return;
        };

        match self.send(url, &Self::build_payload(summary)).await {
            Ok(()) => info!(event = "webhook_sent", "Cycle report delivered"),
            Err(e) => {
                error!(event = "webhook_failed", error = %e, "Failed to deliver cycle report");
            }
        }
    }

    async fn send(&self, url: &str, payload: &WebhookPayload) -> common::Result<()> {
        let body = serde_json::to_string(payload)?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(common::Error::notify)?;

        let status = response.status();
        let _ = response.bytes().await;

        if !status.is_success() {
            return Err(common::Error::notify(format!(
                "webhook returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}
