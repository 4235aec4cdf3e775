use crate::core::ConfigurationError;

use super::listing::Listing;

/// Immutable search configuration shared by every source.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub category: String,
    pub min_price: String,
    pub max_price: String,
    pub ignored_terms: Vec<String>,
}

impl SearchParams {
    /// Validates the raw values. Empty price bounds mean "unbounded"; empty
    /// ignored terms are discarded.
    pub fn new(
        query: impl Into<String>,
        category: impl Into<String>,
        min_price: impl Into<String>,
        max_price: impl Into<String>,
        ignored_terms: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConfigurationError> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(ConfigurationError::EmptyQuery);
        }

        let min_price = min_price.into().trim().to_string();
        let max_price = max_price.into().trim().to_string();
        let min = parse_bound("minimum", &min_price)?;
        let max = parse_bound("maximum", &max_price)?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ConfigurationError::InvertedPriceRange {
                    min: min_price,
                    max: max_price,
                });
            }
        }

        Ok(Self {
            query,
            category: category.into().trim().to_lowercase(),
            min_price,
            max_price,
            ignored_terms: ignored_terms
                .into_iter()
                .filter(|term| !term.is_empty())
                .collect(),
        })
    }

    /// Splits a space-separated ignored-terms argument.
    pub fn split_ignored(raw: &str) -> Vec<String> {
        raw.split(' ').map(str::to_string).collect()
    }

    pub fn filter(&self) -> ListingFilter {
        ListingFilter::new(self.ignored_terms.clone())
    }
}

fn parse_bound(field: &'static str, value: &str) -> Result<Option<f64>, ConfigurationError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some(amount)),
        _ => Err(ConfigurationError::InvalidPrice {
            field,
            value: value.to_string(),
        }),
    }
}

/// Drops sold listings and listings whose url contains an ignored term.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    ignored_terms: Vec<String>,
}

impl ListingFilter {
    pub fn new(ignored_terms: Vec<String>) -> Self {
        Self {
            ignored_terms: ignored_terms
                .into_iter()
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    pub fn keeps(&self, listing: &Listing) -> bool {
        listing.is_not_sold
            && !self
                .ignored_terms
                .iter()
                .any(|term| listing.url.contains(term.as_str()))
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.keeps(l)).collect()
    }
}
