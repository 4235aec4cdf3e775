use thiserror::Error;

/// Failure while retrieving or interpreting one source's response.
///
/// Always recoverable: the owning poller degrades and retries.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Invalid startup configuration. Fatal, raised before any poller starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("{field} price {value:?} is not a valid amount")]
    InvalidPrice { field: &'static str, value: String },

    #[error("minimum price {min} is greater than maximum price {max}")]
    InvertedPriceRange { min: String, max: String },

    #[error("category {category:?} is not supported by {source_name}")]
    UnknownCategory {
        source_name: &'static str,
        category: String,
    },

    #[error("unknown source {0:?}")]
    UnknownSource(String),

    #[error("no sources enabled")]
    NoSources,

    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("retry interval ({retry:?}) must be shorter than poll interval ({poll:?})")]
    RetryNotShorter {
        retry: std::time::Duration,
        poll: std::time::Duration,
    },

    #[error("history capacity must be at least 2, got {0}")]
    HistoryCapacity(usize),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure of the external notification sink. Logged, never retried.
#[derive(Debug, Error)]
pub enum NotificationDeliveryError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint rejected the request with status {0}")]
    Rejected(u16),
}
