use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::{ConfigurationError, HealthChecker};
use crate::monitoring::CrawlMetrics;
use crate::notify::{NotificationContent, Notifier};
use crate::sources::SourceAdapter;

use super::cycle::CrawlCycle;
use super::history::DEFAULT_MAX_HISTORY;
use super::params::ListingFilter;
use super::poller::{PollTimings, Poller};
use super::signal::NewListingSignal;

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub timings: PollTimings,
    pub history_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timings: PollTimings::default(),
            history_capacity: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Runs one poller per source and turns their "found something" signals into
/// a single coalesced notification stream.
pub struct Orchestrator {
    config: OrchestratorConfig,
    pollers: Vec<Poller>,
    signal: Arc<NewListingSignal>,
    notifier: Arc<dyn Notifier>,
    content: NotificationContent,
    health: HealthChecker,
    metrics: Arc<CrawlMetrics>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        notifier: Arc<dyn Notifier>,
        content: NotificationContent,
        health: HealthChecker,
        metrics: Arc<CrawlMetrics>,
    ) -> Self {
        Self {
            config,
            pollers: Vec::new(),
            signal: Arc::new(NewListingSignal::new()),
            notifier,
            content,
            health,
            metrics,
        }
    }

    /// Wraps the adapter in its own crawl cycle and poller. Each source gets a
    /// private history window.
    pub fn add_source(
        &mut self,
        adapter: Box<dyn SourceAdapter>,
        filter: ListingFilter,
    ) -> Result<(), ConfigurationError> {
        let cycle = CrawlCycle::new(adapter, filter, self.config.history_capacity)?;
        tracing::debug!(source = cycle.source_name(), "Source registered");

        self.pollers.push(Poller::new(
            cycle,
            self.config.timings,
            self.signal.clone(),
            self.health.clone(),
            self.metrics.clone(),
        ));
        Ok(())
    }

    pub fn source_count(&self) -> usize {
        self.pollers.len()
    }

    pub fn signal(&self) -> Arc<NewListingSignal> {
        self.signal.clone()
    }

    /// Runs every poller concurrently and dispatches notifications until
    /// `shutdown` is cancelled, then waits for all pollers to stop.
    pub async fn run(self, shutdown: CancellationToken) {
        let Orchestrator {
            pollers,
            signal,
            notifier,
            content,
            metrics,
            ..
        } = self;

        tracing::info!("🚀 Starting {} pollers", pollers.len());

        let handles: Vec<_> = pollers
            .into_iter()
            .map(|poller| tokio::spawn(poller.run(shutdown.child_token())))
            .collect();

        dispatch_notifications(&signal, notifier.as_ref(), &content, &metrics, &shutdown).await;

        tracing::info!("Shutdown requested, waiting for {} pollers", handles.len());
        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("❌ Poller task failed: {}", e);
            }
        }
        tracing::info!("All pollers stopped");
    }
}

/// Waits for the signal, sends one notification, clears the signal, repeats.
/// Every set that lands before the clear is covered by that one notification.
/// Returns once `shutdown` is cancelled.
pub async fn dispatch_notifications(
    signal: &NewListingSignal,
    notifier: &dyn Notifier,
    content: &NotificationContent,
    metrics: &CrawlMetrics,
    shutdown: &CancellationToken,
) {
    while signal.wait_set(shutdown).await {
        let delivered = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            delivered = notifier.notify(&content.title, &content.body) => delivered,
        };

        match delivered {
            Ok(()) => metrics.record_notification(true),
            Err(e) => {
                tracing::warn!("Failed to deliver notification: {}", e);
                metrics.record_notification(false);
            }
        }

        signal.clear();
    }
}
