use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

/// Prometheus counters for the crawl loop. Each instance owns its registry.
#[derive(Clone)]
pub struct CrawlMetrics {
    registry: Registry,
    cycles: IntCounterVec,
    failures: IntCounterVec,
    new_listings: IntCounterVec,
    degraded: IntGaugeVec,
    notifications_sent: IntCounter,
    notification_failures: IntCounter,
}

impl CrawlMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("crawl_cycles_total", "Completed crawl cycles per source"),
            &["source"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("crawl_failures_total", "Failed crawl cycles per source"),
            &["source"],
        )?;
        let new_listings = IntCounterVec::new(
            Opts::new("crawl_new_listings_total", "New listings reported per source"),
            &["source"],
        )?;
        let degraded = IntGaugeVec::new(
            Opts::new("crawl_source_degraded", "1 while the source is failing"),
            &["source"],
        )?;
        let notifications_sent =
            IntCounter::new("notifications_sent_total", "Notifications delivered")?;
        let notification_failures =
            IntCounter::new("notification_failures_total", "Notification delivery failures")?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(new_listings.clone()))?;
        registry.register(Box::new(degraded.clone()))?;
        registry.register(Box::new(notifications_sent.clone()))?;
        registry.register(Box::new(notification_failures.clone()))?;

        Ok(Self {
            registry,
            cycles,
            failures,
            new_listings,
            degraded,
            notifications_sent,
            notification_failures,
        })
    }

    pub fn record_cycle(&self, source: &str, new_listings: usize) {
        self.cycles.with_label_values(&[source]).inc();
        self.new_listings
            .with_label_values(&[source])
            .inc_by(new_listings as u64);
    }

    pub fn record_failure(&self, source: &str) {
        self.failures.with_label_values(&[source]).inc();
    }

    pub fn set_degraded(&self, source: &str, degraded: bool) {
        self.degraded
            .with_label_values(&[source])
            .set(i64::from(degraded));
    }

    pub fn record_notification(&self, delivered: bool) {
        if delivered {
            self.notifications_sent.inc();
        } else {
            self.notification_failures.inc();
        }
    }

    pub fn cycles(&self, source: &str) -> u64 {
        self.cycles.with_label_values(&[source]).get()
    }

    pub fn failures(&self, source: &str) -> u64 {
        self.failures.with_label_values(&[source]).get()
    }

    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent.get()
    }

    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
