use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use marketplace_watch::core::{logging, Config, HealthChecker};
use marketplace_watch::crawler::{Orchestrator, OrchestratorConfig, PollTimings, SearchParams};
use marketplace_watch::monitoring::{self, CrawlMetrics};
use marketplace_watch::notify::{LogNotifier, NotificationContent, Notifier, WebhookNotifier};
use marketplace_watch::sources::{self, http};

/// Watches marketplaces for new listings matching a search.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search terms, e.g. "nintendo switch"
    search: String,
    /// Category tag, e.g. games
    category: String,
    /// Minimum price (empty for no bound)
    min_price: String,
    /// Maximum price (empty for no bound)
    max_price: String,
    /// Space-separated terms; listings whose URL contains any of them are ignored
    ignored: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    logging::init_logging(&config.monitoring.log_level);

    tracing::info!("Marketplace watch v{} starting", env!("CARGO_PKG_VERSION"));

    let params = SearchParams::new(
        args.search,
        args.category,
        args.min_price,
        args.max_price,
        SearchParams::split_ignored(&args.ignored),
    )
    .context("Invalid search parameters")?;

    let client = http::build_client(config.http.timeout)?;
    let adapters = sources::build_adapters(
        &config.crawler.sources,
        &params,
        &client,
        config.crawler.wallapop_max_age,
    )?;

    let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
        Some(url) => {
            tracing::info!("Notifications will be posted to {}", url);
            Arc::new(WebhookNotifier::new(client.clone(), url.clone()))
        }
        None => Arc::new(LogNotifier),
    };

    let health = HealthChecker::new();
    let metrics = Arc::new(CrawlMetrics::new().context("Failed to register metrics")?);

    let orchestrator_config = OrchestratorConfig {
        timings: PollTimings::new(config.crawler.poll_interval, config.crawler.retry_interval)?,
        history_capacity: config.crawler.max_history,
    };
    let mut orchestrator = Orchestrator::new(
        orchestrator_config,
        notifier,
        NotificationContent::for_query(&params.query),
        health.clone(),
        metrics.clone(),
    );
    for adapter in adapters {
        orchestrator.add_source(adapter, params.filter())?;
    }

    tracing::info!(
        "Watching {} source(s) for \"{}\" in {} (poll every {:?})",
        orchestrator.source_count(),
        params.query,
        params.category,
        config.crawler.poll_interval
    );

    let shutdown = CancellationToken::new();

    if let Some(port) = config.monitoring.port {
        tokio::spawn(monitoring::serve(health, metrics, port, shutdown.clone()));
    }

    let ctrl_c = shutdown.clone();
    let poll_interval = config.crawler.poll_interval;
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => println!(
                "\nAttempting to stop all pollers. This can take up to {} seconds.",
                poll_interval.as_secs()
            ),
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
        }
        ctrl_c.cancel();
    });

    orchestrator.run(shutdown).await;

    tracing::info!("Marketplace watch exited");
    Ok(())
}
