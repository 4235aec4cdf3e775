use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::adapter::{CategoryMap, SourceAdapter};
use super::http;
use crate::core::{ConfigurationError, SourceError};
use crate::crawler::{Listing, Price, SearchParams};

const SEARCH_URL: &str = "https://api.wallapop.com/api/v3/general/search/";
const ITEM_BASE_URL: &str = "https://wallapop.com/item/";

pub const CATEGORIES: CategoryMap = CategoryMap::new("wallapop", &[("games", "12900")]);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    search_objects: Option<Vec<SearchObject>>,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    web_slug: String,
    #[serde(default)]
    title: String,
    price: Price,
    flags: ItemFlags,
    /// Milliseconds since the epoch.
    modification_date: f64,
}

#[derive(Debug, Deserialize)]
struct ItemFlags {
    #[serde(default)]
    sold: bool,
}

/// Queries the Wallapop search API, newest first.
pub struct WallapopAdapter {
    client: Client,
    category_id: &'static str,
    query: String,
    min_price: String,
    max_price: String,
    max_age: Duration,
}

impl WallapopAdapter {
    pub fn new(
        client: Client,
        params: &SearchParams,
        max_age: Duration,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            client,
            category_id: CATEGORIES.resolve(&params.category)?,
            query: params.query.clone(),
            min_price: params.min_price.clone(),
            max_price: params.max_price.clone(),
            max_age,
        })
    }
}

#[async_trait]
impl SourceAdapter for WallapopAdapter {
    fn source_name(&self) -> &'static str {
        "wallapop"
    }

    async fn retrieve(&self) -> Result<Vec<Listing>, SourceError> {
        let mut query = vec![
            ("keywords", self.query.as_str()),
            ("category_ids", self.category_id),
            ("filters_source", "quick_filters"),
        ];
        http::optional_param(&mut query, "min_sale_price", &self.min_price);
        http::optional_param(&mut query, "max_sale_price", &self.max_price);
        query.push(("order_by", "newest"));

        let response = http::fetch(self.client.get(SEARCH_URL).query(&query)).await?;
        let body = response.bytes().await?;

        parse_listings(&body, Utc::now().timestamp_millis(), self.max_age)
    }
}

/// Decodes a search payload, dropping items last modified more than `max_age`
/// before `now_ms`.
pub fn parse_listings(
    body: &[u8],
    now_ms: i64,
    max_age: Duration,
) -> Result<Vec<Listing>, SourceError> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    let objects = response
        .search_objects
        .ok_or_else(|| SourceError::Malformed("missing search_objects".to_string()))?;

    let max_age_ms = max_age.as_millis() as f64;

    Ok(objects
        .into_iter()
        .filter(|item| now_ms as f64 - item.modification_date <= max_age_ms)
        .map(|item| {
            let mut listing = Listing::new(format!("{}{}", ITEM_BASE_URL, item.web_slug), item.price)
                .with_title(item.title);
            listing.is_not_sold = !item.flags.sold;
            listing
        })
        .collect())
}
