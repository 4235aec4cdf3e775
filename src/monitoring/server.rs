use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warp::http::StatusCode;
use warp::Filter;

use super::metrics::CrawlMetrics;
use crate::core::HealthChecker;

/// `GET /health` (JSON) and `GET /metrics` (prometheus text).
pub fn routes(
    health_checker: HealthChecker,
    metrics: Arc<CrawlMetrics>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || health_checker.clone()))
        .and_then(|checker: HealthChecker| async move {
            let status = checker.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });

    let metrics = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || metrics.clone()))
        .map(|metrics: Arc<CrawlMetrics>| match metrics.gather_text() {
            Ok(text) => warp::reply::with_status(text, StatusCode::OK),
            Err(e) => {
                tracing::error!("Failed to encode metrics: {}", e);
                warp::reply::with_status(String::new(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        });

    health.or(metrics)
}

/// Serves the monitoring routes until `shutdown` is cancelled.
pub async fn serve(
    health_checker: HealthChecker,
    metrics: Arc<CrawlMetrics>,
    port: u16,
    shutdown: CancellationToken,
) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let bound = warp::serve(routes(health_checker, metrics))
        .try_bind_with_graceful_shutdown(addr, async move { shutdown.cancelled().await });

    match bound {
        Ok((addr, server)) => {
            tracing::info!("Monitoring endpoint listening on {}", addr);
            server.await;
        }
        Err(e) => tracing::error!("Failed to bind monitoring endpoint on {}: {}", addr, e),
    }
}
