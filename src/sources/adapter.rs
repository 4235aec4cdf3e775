use async_trait::async_trait;

use crate::core::{ConfigurationError, SourceError};
use crate::crawler::Listing;

/// One marketplace: fetches the current result set and translates it into
/// listings. Stateless between calls; no retries, no filtering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn retrieve(&self) -> Result<Vec<Listing>, SourceError>;
}

/// Fixed lookup from a category tag to a source-specific identifier.
#[derive(Debug, Clone, Copy)]
pub struct CategoryMap {
    source_name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl CategoryMap {
    pub const fn new(
        source_name: &'static str,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            source_name,
            entries,
        }
    }

    pub fn resolve(&self, category: &str) -> Result<&'static str, ConfigurationError> {
        self.entries
            .iter()
            .find(|(tag, _)| *tag == category)
            .map(|(_, id)| *id)
            .ok_or_else(|| ConfigurationError::UnknownCategory {
                source_name: self.source_name,
                category: category.to_string(),
            })
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(tag, _)| *tag)
    }
}
