pub mod adapter;
pub mod http;
pub mod subito;
pub mod wallapop;

pub use adapter::{CategoryMap, SourceAdapter};
pub use subito::SubitoAdapter;
pub use wallapop::WallapopAdapter;

use reqwest::Client;
use std::time::Duration;

use crate::core::ConfigurationError;
use crate::crawler::SearchParams;

/// Builds one adapter per enabled source name. Any unknown source or
/// unmapped category fails the whole set.
pub fn build_adapters(
    names: &[String],
    params: &SearchParams,
    client: &Client,
    wallapop_max_age: Duration,
) -> Result<Vec<Box<dyn SourceAdapter>>, ConfigurationError> {
    if names.is_empty() {
        return Err(ConfigurationError::NoSources);
    }

    names
        .iter()
        .map(|name| -> Result<Box<dyn SourceAdapter>, ConfigurationError> {
            match name.as_str() {
                "subito" => Ok(Box::new(SubitoAdapter::new(client.clone(), params)?)),
                "wallapop" => Ok(Box::new(WallapopAdapter::new(
                    client.clone(),
                    params,
                    wallapop_max_age,
                )?)),
                other => Err(ConfigurationError::UnknownSource(other.to_string())),
            }
        })
        .collect()
}
