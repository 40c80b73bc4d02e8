//! Server wiring: the shared cycle pipeline and task supervision.

use crate::http_server::TriggerServer;
use crate::metrics::MetricsRegistry;
use crate::notifier::WebhookNotifier;
use crate::scheduler::Scheduler;
use crate::types::ServerConfig;
use keepalive::pinger::HttpPinger;
use keepalive::runner::CycleRunner;
use keepalive::source::{HttpProjectSource, SourceError};
use keepalive::types::Summary;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// One fetch → ping-all → notify pass, shared by both triggers.
pub struct Pipeline {
    runner: CycleRunner,
    notifier: WebhookNotifier,
    metrics: Arc<MetricsRegistry>,
    // Serializes cycles. The trigger model keeps them short-lived, the
    // lock keeps a slow cycle from overlapping the next timer firing.
    cycle_lock: Mutex<()>,
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new(
        runner: CycleRunner,
        notifier: WebhookNotifier,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            runner,
            notifier,
            metrics,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Access the metrics registry
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Run one cycle, waiting if another is in flight
    pub async fn run(&self) -> Result<Summary, SourceError> {
        let _guard = self.cycle_lock.lock().await;
        self.run_locked().await
    }

    /// Run one cycle unless another is in flight
    pub async fn try_run(&self) -> Option<Result<Summary, SourceError>> {
        let _guard = self.cycle_lock.try_lock().ok()?;
        Some(self.run_locked().await)
    }

    async fn run_locked(&self) -> Result<Summary, SourceError> {
        match self.runner.run().await {
            Ok(summary) => {
                self.metrics.record_cycle(&summary);

                // Awaited: the cycle is not complete while the report is
                // still in flight.
                self.notifier.notify(&summary).await;

                Ok(summary)
            }
            Err(e) => {
                self.metrics.record_cycle_error();
                Err(e)
            }
        }
    }
}

/// Keepalive server
pub struct KeepaliveServer {
    config: ServerConfig,
}

impl KeepaliveServer {
    /// Create a new keepalive server
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Build the shared pipeline from the configuration
    pub fn build_pipeline(&self) -> common::Result<Arc<Pipeline>> {
        let client = reqwest::Client::builder()
            .timeout(self.config.probe_timeout)
            .build()
            .map_err(common::Error::other)?;

        let source = HttpProjectSource::new(client.clone(), &self.config.projects_url);
        let pinger = HttpPinger::with_client(client.clone());
        let runner = CycleRunner::new(Arc::new(source), Arc::new(pinger));

        let notifier = WebhookNotifier::new(
            client,
            self.config.webhook_url.clone(),
            self.config.notify_policy,
        );

        Ok(Arc::new(Pipeline::new(
            runner,
            notifier,
            Arc::new(MetricsRegistry::new()),
        )))
    }

    /// Run the server
    pub async fn run(self) -> common::Result<()> {
        info!("Starting keepalive server");

        let pipeline = self.build_pipeline()?;

        // Spawn scheduler task (if enabled)
        let scheduler_handle = if self.config.scheduler_enabled {
            let scheduler = Scheduler::new(pipeline.clone(), self.config.cycle_interval);
            Some(tokio::spawn(async move {
                scheduler.run().await;
            }))
        } else {
            info!("Scheduler disabled");
            None
        };

        // Spawn trigger HTTP server task
        let server = TriggerServer::new(
            pipeline,
            self.config.listen_addr.clone(),
            self.config.metrics_enabled,
        );
        let http_handle = tokio::spawn(async move {
            if let Err(e) = server.run().await {
                warn!(error = %e, "Trigger server error");
            }
        });

        info!("All tasks spawned, server running");

        // Wait for tasks to complete (they shouldn't unless shutdown)
        tokio::select! {
            _ = http_handle => {
                info!("Trigger server task completed");
            }
            _ = async {
                if let Some(handle) = scheduler_handle {
                    let _ = handle.await;
                } else {
                    // Never completes if the scheduler is disabled
                    std::future::pending::<()>().await;
                }
            } => {
                info!("Scheduler task completed");
            }
        }

        info!("Keepalive server stopped");
        Ok(())
    }
}
