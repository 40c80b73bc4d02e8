//! Timer-driven cycle scheduling.

use crate::server::Pipeline;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs the pipeline on a fixed cadence.
///
/// A failed cycle is a log event only; the next firing is the recovery
/// path.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    interval: Duration,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(pipeline: Arc<Pipeline>, interval: Duration) -> Self {
        Self { pipeline, interval }
    }

    /// Run the scheduler task
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Scheduler task started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await; // Skip first immediate tick

        loop {
            ticker.tick().await;

            info!(
                event = "cron_start",
                scheduled_time = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                "Scheduled cycle starting"
            );

            match self.pipeline.try_run().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(event = "cron_error", error = %e, "Scheduled cycle failed");
                }
                None => {
                    warn!("Previous cycle still running, skipping this firing");
                }
            }
        }
    }
}
