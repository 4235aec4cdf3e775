use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Asking price as published by the source. Never used for arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{}", amount),
            Price::Text(text) => write!(f, "{}", text.trim()),
        }
    }
}

impl From<&str> for Price {
    fn from(text: &str) -> Self {
        Price::Text(text.to_string())
    }
}

impl From<f64> for Price {
    fn from(amount: f64) -> Self {
        Price::Amount(amount)
    }
}

/// One marketplace item. Identity is the `url` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub url: String,
    pub title: String,
    pub price: Price,
    pub shipping_cost: Option<String>,
    pub is_not_sold: bool,
    pub is_not_pinned: bool,
}

impl Listing {
    pub fn new(url: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            price: price.into(),
            shipping_cost: None,
            is_not_sold: true,
            is_not_pinned: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_shipping_cost(mut self, cost: impl Into<String>) -> Self {
        self.shipping_cost = Some(cost.into());
        self
    }

    pub fn sold(mut self) -> Self {
        self.is_not_sold = false;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.is_not_pinned = false;
        self
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Listing {}

impl Hash for Listing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}
