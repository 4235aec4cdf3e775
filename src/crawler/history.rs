use std::collections::{HashMap, VecDeque};

use crate::core::ConfigurationError;

use super::listing::Listing;

pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Bounded, ordered record of listings already reported by one source.
///
/// When an append pushes the window past its capacity, the oldest
/// `capacity / 2` entries are dropped at once (repeated until the window fits
/// again). Items evicted this way can be reported as new a second time.
#[derive(Debug)]
pub struct HistoryWindow {
    capacity: usize,
    entries: VecDeque<Listing>,
    // url -> occurrences in `entries`
    index: HashMap<String, usize>,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Result<Self, ConfigurationError> {
        if capacity < 2 {
            return Err(ConfigurationError::HistoryCapacity(capacity));
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
            index: HashMap::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Listings from `batch` whose url is not in the window, in batch order.
    pub fn unseen(&self, batch: Vec<Listing>) -> Vec<Listing> {
        batch
            .into_iter()
            .filter(|listing| !self.contains(&listing.url))
            .collect()
    }

    pub fn extend(&mut self, listings: &[Listing]) {
        if listings.is_empty() {
            return;
        }
        for listing in listings {
            *self.index.entry(listing.url.clone()).or_insert(0) += 1;
            self.entries.push_back(listing.clone());
        }
        self.evict();
    }

    fn evict(&mut self) {
        let half = self.capacity / 2;
        while self.entries.len() > self.capacity {
            let before = self.entries.len();
            for listing in self.entries.drain(..half) {
                if let Some(count) = self.index.get_mut(&listing.url) {
                    *count -= 1;
                    if *count == 0 {
                        self.index.remove(&listing.url);
                    }
                }
            }
            tracing::debug!(
                "History window trimmed from {} to {} entries",
                before,
                self.entries.len()
            );
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings(range: std::ops::Range<usize>) -> Vec<Listing> {
        range
            .map(|i| Listing::new(format!("https://x.it/{}", i), "1"))
            .collect()
    }

    #[test]
    fn test_reaching_capacity_does_not_evict() {
        let mut history = HistoryWindow::new(500).unwrap();
        history.extend(&listings(0..499));
        assert_eq!(history.len(), 499);

        history.extend(&listings(499..500));
        assert_eq!(history.len(), 500);
        assert!(history.contains("https://x.it/0"));
    }

    #[test]
    fn test_exceeding_capacity_drops_oldest_half() {
        let mut history = HistoryWindow::new(500).unwrap();
        history.extend(&listings(0..500));
        history.extend(&listings(500..501));

        assert_eq!(history.len(), 251);
        assert!(!history.contains("https://x.it/249"));
        assert!(history.contains("https://x.it/250"));
        assert!(history.contains("https://x.it/500"));
        assert_eq!(history.iter().next().unwrap().url, "https://x.it/250");
    }

    #[test]
    fn test_oversized_batch_halves_until_within_capacity() {
        let mut history = HistoryWindow::new(10).unwrap();
        history.extend(&listings(0..8));
        history.extend(&listings(8..20));

        // 20 -> 15 -> 10
        assert_eq!(history.len(), 10);
        assert!(history.len() <= history.capacity());
        assert!(history.contains("https://x.it/10"));
        assert!(!history.contains("https://x.it/9"));
    }

    #[test]
    fn test_unseen_preserves_batch_order() {
        let mut history = HistoryWindow::new(10).unwrap();
        history.extend(&listings(1..2));

        let fresh = history.unseen(listings(0..4));
        let urls: Vec<_> = fresh.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x.it/0", "https://x.it/2", "https://x.it/3"]);
    }

    #[test]
    fn test_duplicate_urls_survive_partial_eviction() {
        let mut history = HistoryWindow::new(4).unwrap();
        let dup = Listing::new("https://x.it/dup", "1");
        history.extend(&[dup.clone(), Listing::new("https://x.it/a", "1")]);
        history.extend(&[Listing::new("https://x.it/b", "1"), dup.clone()]);
        history.extend(&listings(0..1));

        // first "dup" evicted with "a", the later copy keeps the url known
        assert_eq!(history.len(), 3);
        assert!(history.contains("https://x.it/dup"));
        assert!(!history.contains("https://x.it/a"));
    }

    #[test]
    fn test_capacity_below_two_is_rejected() {
        assert!(matches!(
            HistoryWindow::new(1),
            Err(ConfigurationError::HistoryCapacity(1))
        ));
    }
}
