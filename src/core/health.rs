use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub sources: BTreeMap<String, bool>,
}

/// Per-source health flags shared between pollers and the monitoring endpoint.
#[derive(Clone)]
pub struct HealthChecker {
    start_time: std::time::Instant,
    sources: Arc<RwLock<BTreeMap<String, bool>>>,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            sources: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn get_status(&self) -> HealthStatus {
        let sources = self.sources.read().await.clone();

        HealthStatus {
            status: if sources.values().all(|healthy| *healthy) {
                "healthy".to_string()
            } else {
                "degraded".to_string()
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            sources,
        }
    }

    pub async fn update_source(&self, source: &str, healthy: bool) {
        self.sources
            .write()
            .await
            .insert(source.to_string(), healthy);
    }

    pub async fn is_healthy(&self, source: &str) -> Option<bool> {
        self.sources.read().await.get(source).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_is_degraded_when_any_source_is_down() {
        let checker = HealthChecker::new();
        checker.update_source("subito", true).await;
        checker.update_source("wallapop", true).await;
        assert_eq!(checker.get_status().await.status, "healthy");

        checker.update_source("wallapop", false).await;
        let status = checker.get_status().await;
        assert_eq!(status.status, "degraded");
        assert_eq!(status.sources.get("subito"), Some(&true));
        assert_eq!(checker.is_healthy("wallapop").await, Some(false));
    }

    #[tokio::test]
    async fn test_no_sources_reports_healthy() {
        let checker = HealthChecker::new();
        assert_eq!(checker.get_status().await.status, "healthy");
        assert_eq!(checker.is_healthy("subito").await, None);
    }
}
