// History service - Use case for the three chart endpoints
use crate::application::economy_repository::EconomyRepository;
use crate::domain::chart::{downsample, ChartRange, PricePoint};
use crate::domain::token::TokenQuote;
use chrono::Utc;
use std::sync::Arc;

/// Serves downsampled price history for the token, item and gold charts.
/// Resolves the range token, queries the window sorted ascending, then thins
/// the points to one per bucket.
#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn EconomyRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn EconomyRepository>) -> Self {
        Self { repository }
    }

    pub async fn latest_token(&self) -> anyhow::Result<Option<TokenQuote>> {
        self.repository.latest_token_quote().await
    }

    pub async fn token_history(&self, range_token: &str) -> anyhow::Result<Vec<PricePoint>> {
        let range = ChartRange::parse(range_token, ChartRange::Day);
        let since = Utc::now().timestamp() - range.lookback_secs();

        let quotes = self.repository.token_quotes_since(since).await?;
        let points = quotes
            .into_iter()
            .map(|q| PricePoint::new(q.last_updated, q.price))
            .collect();

        Ok(downsample(points, range.bucket_secs()))
    }

    /// `None` when the item is not on the watchlist.
    pub async fn item_history(
        &self,
        item_id: i64,
        range_token: &str,
    ) -> anyhow::Result<Option<Vec<PricePoint>>> {
        let Some(tracked) = self.repository.find_tracked_item(item_id).await? else {
            return Ok(None);
        };

        // Items default to the 14d view, unlike the token chart.
        let range = ChartRange::parse(range_token, ChartRange::Fortnight);
        let since = Utc::now().timestamp() - range.lookback_secs();

        let quotes = self.repository.item_quotes_since(tracked.id, since).await?;
        let points = quotes
            .into_iter()
            .map(|q| PricePoint::new(q.recorded_at, q.buyout))
            .collect();

        Ok(Some(downsample(points, range.bucket_secs())))
    }

    pub async fn gold_history(&self, range_token: &str) -> anyhow::Result<Vec<PricePoint>> {
        let range = ChartRange::parse(range_token, ChartRange::Fortnight);
        let since = Utc::now().timestamp() - range.lookback_secs();

        let snapshots = self.repository.gold_snapshots_since(since).await?;
        let points = snapshots
            .into_iter()
            .map(|s| PricePoint::new(s.recorded_at, s.total_gold))
            .collect();

        Ok(downsample(points, range.bucket_secs()))
    }
}
