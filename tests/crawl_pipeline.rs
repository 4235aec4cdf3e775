use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use marketplace_watch::core::{HealthChecker, NotificationDeliveryError, SourceError};
use marketplace_watch::crawler::{
    CrawlCycle, Listing, ListingFilter, Orchestrator, OrchestratorConfig, PollTimings,
    SearchParams,
};
use marketplace_watch::monitoring::CrawlMetrics;
use marketplace_watch::notify::{NotificationContent, Notifier};
use marketplace_watch::sources::SourceAdapter;

const POLL: Duration = Duration::from_secs(15);
const RETRY: Duration = Duration::from_secs(5);

/// Replays scripted batches, then keeps returning the last successful one.
struct ScriptedAdapter {
    name: &'static str,
    script: Mutex<VecDeque<Result<Vec<Listing>, SourceError>>>,
    last: Mutex<Vec<Listing>>,
}

impl ScriptedAdapter {
    fn new(name: &'static str, script: Vec<Result<Vec<Listing>, SourceError>>) -> Self {
        Self {
            name,
            script: Mutex::new(script.into()),
            last: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn retrieve(&self) -> Result<Vec<Listing>, SourceError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(batch)) => {
                *self.last.lock().unwrap() = batch.clone();
                Ok(batch)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

/// Counts notifications; each delivery takes `latency` of (virtual) time.
struct SlowNotifier {
    sent: AtomicUsize,
    latency: Duration,
}

#[async_trait]
impl Notifier for SlowNotifier {
    async fn notify(&self, _title: &str, _body: &str) -> Result<(), NotificationDeliveryError> {
        tokio::time::sleep(self.latency).await;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn unsold(url: &str) -> Listing {
    Listing::new(url, "100")
}

fn build(notifier: Arc<SlowNotifier>) -> (Orchestrator, Arc<CrawlMetrics>) {
    let metrics = Arc::new(CrawlMetrics::new().unwrap());
    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            timings: PollTimings::new(POLL, RETRY).unwrap(),
            history_capacity: 500,
        },
        notifier,
        NotificationContent::for_query("switch"),
        HealthChecker::new(),
        metrics.clone(),
    );
    (orchestrator, metrics)
}

#[tokio::test]
async fn test_cycle_reports_each_listing_once() {
    let adapter = ScriptedAdapter::new(
        "scripted",
        vec![
            Ok(vec![unsold("a")]),
            Ok(vec![unsold("a")]),
            Ok(vec![unsold("a"), unsold("b")]),
        ],
    );
    let mut cycle = CrawlCycle::new(Box::new(adapter), ListingFilter::default(), 500).unwrap();

    assert_eq!(cycle.cycle().await.unwrap(), vec![unsold("a")]);
    assert!(cycle.cycle().await.unwrap().is_empty());
    assert_eq!(cycle.cycle().await.unwrap(), vec![unsold("b")]);
}

#[tokio::test]
async fn test_cli_style_parameters_drive_the_filter() {
    let params = SearchParams::new(
        "switch",
        "games",
        "50",
        "300",
        SearchParams::split_ignored("rotto broken"),
    )
    .unwrap();
    let adapter = ScriptedAdapter::new(
        "scripted",
        vec![Ok(vec![
            unsold("https://x.it/switch-rotto-1"),
            unsold("https://x.it/switch-broken-2"),
            unsold("https://x.it/switch-3").sold(),
            unsold("https://x.it/switch-4"),
        ])],
    );
    let mut cycle = CrawlCycle::new(Box::new(adapter), params.filter(), 500).unwrap();

    assert_eq!(
        cycle.cycle().await.unwrap(),
        vec![unsold("https://x.it/switch-4")]
    );
}

#[tokio::test]
async fn test_history_halves_at_capacity() {
    let first: Vec<_> = (0..500).map(|i| unsold(&format!("item-{}", i))).collect();
    let adapter = ScriptedAdapter::new(
        "scripted",
        vec![Ok(first), Ok(vec![unsold("item-500")]), Ok(vec![unsold("item-0")])],
    );
    let mut cycle = CrawlCycle::new(Box::new(adapter), ListingFilter::default(), 500).unwrap();

    assert_eq!(cycle.cycle().await.unwrap().len(), 500);
    assert_eq!(cycle.history().len(), 500);

    cycle.cycle().await.unwrap();
    assert_eq!(cycle.history().len(), 251);

    // evicted by the halving, so it counts as new again
    assert_eq!(cycle.cycle().await.unwrap(), vec![unsold("item-0")]);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_notifies_once_per_new_batch() {
    let notifier = Arc::new(SlowNotifier {
        sent: AtomicUsize::new(0),
        latency: Duration::from_millis(100),
    });
    let (mut orchestrator, metrics) = build(notifier.clone());
    orchestrator
        .add_source(
            Box::new(ScriptedAdapter::new(
                "scripted",
                vec![
                    Ok(vec![unsold("a")]),
                    Ok(vec![unsold("a")]),
                    Ok(vec![unsold("a"), unsold("b")]),
                ],
            )),
            ListingFilter::default(),
        )
        .unwrap();

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(orchestrator.run(shutdown.clone()));

    tokio::time::sleep(POLL / 2).await;
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

    tokio::time::sleep(POLL).await;
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

    tokio::time::sleep(POLL).await;
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 2);
    assert_eq!(metrics.cycles("scripted"), 3);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_two_sources_in_one_window_coalesce() {
    let notifier = Arc::new(SlowNotifier {
        sent: AtomicUsize::new(0),
        latency: Duration::from_secs(1),
    });
    let (mut orchestrator, metrics) = build(notifier.clone());
    for name in ["first", "second"] {
        orchestrator
            .add_source(
                Box::new(ScriptedAdapter::new(name, vec![Ok(vec![unsold(name)])])),
                ListingFilter::default(),
            )
            .unwrap();
    }

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(orchestrator.run(shutdown.clone()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.notifications_sent(), 1);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_outage_recovers_without_notifying() {
    let notifier = Arc::new(SlowNotifier {
        sent: AtomicUsize::new(0),
        latency: Duration::ZERO,
    });
    let (mut orchestrator, metrics) = build(notifier.clone());
    orchestrator
        .add_source(
            Box::new(ScriptedAdapter::new(
                "flaky",
                vec![
                    Err(SourceError::Malformed("503".to_string())),
                    Err(SourceError::Malformed("503".to_string())),
                    Ok(Vec::new()),
                ],
            )),
            ListingFilter::default(),
        )
        .unwrap();

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(orchestrator.run(shutdown.clone()));

    // attempts at t = 0, 5, 10 (retry interval), next at 25 (poll interval)
    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(metrics.failures("flaky"), 2);
    assert_eq!(metrics.cycles("flaky"), 1);
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(metrics.cycles("flaky"), 1);

    shutdown.cancel();
    handle.await.unwrap();
}
