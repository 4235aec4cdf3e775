use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use crate::core::{ConfigurationError, SourceError};

/// Shared client for every adapter. Caching is disabled so each poll sees the
/// live result set.
pub fn build_client(timeout: Duration) -> Result<Client, ConfigurationError> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    Client::builder()
        .default_headers(headers)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(ConfigurationError::HttpClient)
}

/// Sends the request and rejects non-success statuses.
pub async fn fetch(request: RequestBuilder) -> Result<Response, SourceError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        tracing::debug!("Source returned {} for {}", status, response.url());
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    Ok(response)
}

/// Appends a query parameter only when the value is non-empty.
pub fn optional_param<'a>(
    params: &mut Vec<(&'static str, &'a str)>,
    key: &'static str,
    value: &'a str,
) {
    if !value.is_empty() {
        params.push((key, value));
    }
}
