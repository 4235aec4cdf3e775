pub mod metrics;
pub mod server;

pub use metrics::CrawlMetrics;
pub use server::serve;
