use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::adapter::{CategoryMap, SourceAdapter};
use super::http;
use crate::core::{ConfigurationError, SourceError};
use crate::crawler::{Listing, SearchParams};

const BASE_URL: &str = "https://www.subito.it";
const SEARCH_PATH: &str = "/annunci-italia/vendita/";

pub const CATEGORIES: CategoryMap = CategoryMap::new("subito", &[("games", "videogiochi")]);

// Hardcoded selectors; a parse failure here is a programming error.
static ITEM_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item-card").expect("BUG: invalid selector '.item-card'"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".link").expect("BUG: invalid selector '.link'"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("BUG: invalid selector 'h2'"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price").expect("BUG: invalid selector '.price'"));
static SOLD_BADGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".item-sold-badge").expect("BUG: invalid selector '.item-sold-badge'")
});
static PINNED_BADGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".PostingTimeAndPlace-module_vetrina-badge__XWWCm")
        .expect("BUG: invalid pinned badge selector")
});

/// Scrapes the Subito search results page.
pub struct SubitoAdapter {
    client: Client,
    search_url: String,
    query: String,
    min_price: String,
    max_price: String,
}

impl SubitoAdapter {
    pub fn new(client: Client, params: &SearchParams) -> Result<Self, ConfigurationError> {
        let category = CATEGORIES.resolve(&params.category)?;

        Ok(Self {
            client,
            search_url: format!("{}{}{}/", BASE_URL, SEARCH_PATH, category),
            query: params.query.clone(),
            min_price: params.min_price.clone(),
            max_price: params.max_price.clone(),
        })
    }
}

#[async_trait]
impl SourceAdapter for SubitoAdapter {
    fn source_name(&self) -> &'static str {
        "subito"
    }

    async fn retrieve(&self) -> Result<Vec<Listing>, SourceError> {
        let mut query = vec![("q", self.query.as_str())];
        http::optional_param(&mut query, "ps", &self.min_price);
        http::optional_param(&mut query, "pe", &self.max_price);

        let response = http::fetch(self.client.get(&self.search_url).query(&query)).await?;
        let body = response.text().await?;

        parse_listings(&body)
    }
}

/// Extracts non-pinned item cards from a results page.
pub fn parse_listings(html: &str) -> Result<Vec<Listing>, SourceError> {
    let document = Html::parse_document(html);

    document
        .select(&ITEM_CARD)
        .filter(|card| card.select(&PINNED_BADGE).next().is_none())
        .map(parse_card)
        .collect()
}

fn parse_card(card: ElementRef<'_>) -> Result<Listing, SourceError> {
    let href = card
        .select(&LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| SourceError::Malformed("item card without link".to_string()))?;

    let url = if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        href.to_string()
    };

    let price = card
        .select(&PRICE)
        .next()
        .map(|price| text_of(price))
        .map(|text| text.split('€').next().unwrap_or_default().trim().to_string())
        .unwrap_or_default();

    let title = card.select(&TITLE).next().map(text_of).unwrap_or_default();

    let mut listing = Listing::new(url, price.as_str()).with_title(title);
    listing.is_not_sold = card.select(&SOLD_BADGE).next().is_none();

    Ok(listing)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
