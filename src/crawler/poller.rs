use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::{ConfigurationError, HealthChecker};
use crate::monitoring::CrawlMetrics;

use super::cycle::CrawlCycle;
use super::report::ConsoleReporter;
use super::signal::NewListingSignal;

/// Sleep after a successful cycle and after a failed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    pub poll_interval: Duration,
    pub retry_interval: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            retry_interval: Duration::from_secs(5),
        }
    }
}

impl PollTimings {
    pub fn new(poll_interval: Duration, retry_interval: Duration) -> Result<Self, ConfigurationError> {
        if retry_interval >= poll_interval {
            return Err(ConfigurationError::RetryNotShorter {
                retry: retry_interval,
                poll: poll_interval,
            });
        }
        Ok(Self {
            poll_interval,
            retry_interval,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Degraded,
    Recovered,
}

/// Result of one poll iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub new_listings: usize,
    pub delay: Duration,
    pub transition: Option<Transition>,
}

/// Drives one source's crawl cycle forever, until cancelled.
pub struct Poller {
    cycle: CrawlCycle,
    timings: PollTimings,
    state: PollerState,
    signal: Arc<NewListingSignal>,
    reporter: ConsoleReporter,
    health: HealthChecker,
    metrics: Arc<CrawlMetrics>,
}

impl Poller {
    pub fn new(
        cycle: CrawlCycle,
        timings: PollTimings,
        signal: Arc<NewListingSignal>,
        health: HealthChecker,
        metrics: Arc<CrawlMetrics>,
    ) -> Self {
        let reporter = ConsoleReporter::for_source(cycle.source_name());
        Self {
            cycle,
            timings,
            state: PollerState::Healthy,
            signal,
            reporter,
            health,
            metrics,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.cycle.source_name()
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Runs one crawl cycle and decides how long to wait before the next.
    pub async fn tick(&mut self) -> TickOutcome {
        let source = self.cycle.source_name();

        match self.cycle.cycle().await {
            Ok(fresh) => {
                let transition = if self.state == PollerState::Degraded {
                    self.state = PollerState::Healthy;
                    self.health.update_source(source, true).await;
                    self.metrics.set_degraded(source, false);
                    tracing::info!(source, "Source recovered");
                    Some(Transition::Recovered)
                } else {
                    None
                };

                self.metrics.record_cycle(source, fresh.len());

                if !fresh.is_empty() {
                    tracing::info!(source, count = fresh.len(), "New listings found");
                    self.reporter.report(&fresh);
                    self.signal.set();
                }

                TickOutcome {
                    new_listings: fresh.len(),
                    delay: self.timings.poll_interval,
                    transition,
                }
            }
            Err(e) => {
                self.metrics.record_failure(source);

                let transition = if self.state == PollerState::Healthy {
                    self.state = PollerState::Degraded;
                    self.health.update_source(source, false).await;
                    self.metrics.set_degraded(source, true);
                    tracing::warn!(
                        source,
                        error = %e,
                        "Source unavailable, retrying every {:?}",
                        self.timings.retry_interval
                    );
                    Some(Transition::Degraded)
                } else {
                    tracing::debug!(source, error = %e, "Source still unavailable");
                    None
                };

                TickOutcome {
                    new_listings: 0,
                    delay: self.timings.retry_interval,
                    transition,
                }
            }
        }
    }

    /// Polls until `cancel` fires. Cancellation interrupts both the retrieval
    /// and the sleep, so shutdown never waits longer than one interval.
    pub async fn run(mut self, cancel: CancellationToken) {
        let source = self.source_name();
        self.health.update_source(source, true).await;
        tracing::info!(source, "Poller started");

        while !cancel.is_cancelled() {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.tick() => outcome,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(outcome.delay) => {}
            }
        }

        tracing::info!(source, "Poller stopped");
    }
}
