//! Cycle orchestration: fetch projects, fan out pings, fold a summary.

use crate::pinger::Pinger;
use crate::source::{ProjectSource, SourceError};
use crate::types::Summary;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs one complete probe cycle.
pub struct CycleRunner {
    source: Arc<dyn ProjectSource>,
    pinger: Arc<dyn Pinger>,
}

impl CycleRunner {
    /// Create a new cycle runner
    pub fn new(source: Arc<dyn ProjectSource>, pinger: Arc<dyn Pinger>) -> Self {
        Self { source, pinger }
    }

    /// Run one cycle: fetch the project list, ping every project
    /// concurrently, and fold the results into a summary.
    ///
    /// Fan-out width equals project count; the cycle waits for the
    /// slowest ping. Result order matches project order regardless of
    /// completion order. Only a project-list fetch failure propagates.
    pub async fn run(&self) -> Result<Summary, SourceError> {
        let projects = self.source.fetch().await?;

        let start = Instant::now();
        let results = join_all(projects.iter().map(|p| self.pinger.ping(p))).await;
        let total_time = start.elapsed().as_millis() as u64;

        let summary = Summary::from_results(results);

        if summary.has_failures() {
            warn!(
                event = "summary",
                total = summary.total,
                up = summary.up,
                down = summary.down,
                avg_response_time_ms = summary.avg_response_time,
                total_time_ms = total_time,
                "Cycle finished with failures"
            );
        } else {
            info!(
                event = "summary",
                total = summary.total,
                up = summary.up,
                down = summary.down,
                avg_response_time_ms = summary.avg_response_time,
                total_time_ms = total_time,
                "Cycle finished"
            );
        }

        Ok(summary)
    }
}
