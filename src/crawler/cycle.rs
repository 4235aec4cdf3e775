use crate::core::{ConfigurationError, SourceError};
use crate::sources::SourceAdapter;

use super::history::HistoryWindow;
use super::listing::Listing;
use super::params::ListingFilter;

/// One source's retrieve → filter → dedup → remember pipeline.
///
/// The history window is owned here and only touched through `cycle`, so a
/// cycle never needs a lock.
pub struct CrawlCycle {
    adapter: Box<dyn SourceAdapter>,
    filter: ListingFilter,
    history: HistoryWindow,
    source_name: &'static str,
}

impl CrawlCycle {
    pub fn new(
        adapter: Box<dyn SourceAdapter>,
        filter: ListingFilter,
        history_capacity: usize,
    ) -> Result<Self, ConfigurationError> {
        let source_name = adapter.source_name();
        Ok(Self {
            adapter,
            filter,
            history: HistoryWindow::new(history_capacity)?,
            source_name,
        })
    }

    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// Returns the listings that are unsold, not ignored, and not seen before.
    /// A retrieval error leaves the history untouched.
    pub async fn cycle(&mut self) -> Result<Vec<Listing>, SourceError> {
        let retrieved = self.adapter.retrieve().await?;
        let retrieved_count = retrieved.len();

        let fresh = self.history.unseen(self.filter.apply(retrieved));
        self.history.extend(&fresh);

        tracing::trace!(
            source = self.source_name,
            retrieved = retrieved_count,
            new = fresh.len(),
            history = self.history.len(),
            "Crawl cycle complete"
        );

        Ok(fresh)
    }
}
