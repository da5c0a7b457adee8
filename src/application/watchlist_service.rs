// Watchlist service - Use case for tracked-item management
use crate::application::economy_repository::EconomyRepository;
use crate::application::market_feed::MarketFeed;
use crate::domain::item::{TrackedItem, WatchlistEntry};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Item already tracked")]
    AlreadyTracked,
    #[error("Item not found on Battle.net API")]
    UnknownItem,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct WatchlistService {
    repository: Arc<dyn EconomyRepository>,
    feed: Arc<dyn MarketFeed>,
}

impl WatchlistService {
    pub fn new(repository: Arc<dyn EconomyRepository>, feed: Arc<dyn MarketFeed>) -> Self {
        Self { repository, feed }
    }

    /// Every tracked item joined with its most recent recorded quote.
    pub async fn watchlist(&self) -> anyhow::Result<Vec<WatchlistEntry>> {
        let items = self.repository.list_tracked_items().await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let latest = self.repository.latest_item_quote(item.id).await?;
            entries.push(WatchlistEntry::new(item, latest.as_ref()));
        }
        Ok(entries)
    }

    /// Add an item to the watchlist, resolving its catalog details upstream.
    pub async fn track(&self, item_id: i64) -> Result<TrackedItem, WatchlistError> {
        if self
            .repository
            .find_tracked_item(item_id)
            .await
            .map_err(WatchlistError::Other)?
            .is_some()
        {
            return Err(WatchlistError::AlreadyTracked);
        }

        let summary = self
            .feed
            .item_summary(item_id)
            .await
            .map_err(WatchlistError::Other)?
            .ok_or(WatchlistError::UnknownItem)?;

        let tracked = self
            .repository
            .add_tracked_item(&summary)
            .await
            .map_err(WatchlistError::Other)?;

        Ok(tracked)
    }

    /// Remove an item and its price history. Returns whether it was tracked.
    pub async fn untrack(&self, item_id: i64) -> anyhow::Result<bool> {
        self.repository.remove_tracked_item(item_id).await
    }
}
