// In-memory fakes for the repository and feed ports, shared by service tests
use crate::application::economy_repository::EconomyRepository;
use crate::application::market_feed::{CommodityListing, MarketFeed};
use crate::domain::character::{Character, GoldSnapshot};
use crate::domain::item::{ItemQuote, ItemSummary, TrackedItem};
use crate::domain::token::TokenQuote;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct RepositoryState {
    token_quotes: Vec<TokenQuote>,
    tracked_items: Vec<TrackedItem>,
    item_quotes: Vec<ItemQuote>,
    characters: Vec<Character>,
    gold_snapshots: Vec<GoldSnapshot>,
}

#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<RepositoryState>,
}

impl FakeRepository {
    pub async fn push_token_quotes(&self, quotes: Vec<TokenQuote>) {
        self.state.lock().await.token_quotes.extend(quotes);
    }

    pub async fn push_item_quotes(&self, quotes: Vec<ItemQuote>) {
        self.state.lock().await.item_quotes.extend(quotes);
    }

    pub async fn push_gold_snapshots(&self, snapshots: Vec<GoldSnapshot>) {
        self.state.lock().await.gold_snapshots.extend(snapshots);
    }

    pub async fn seed_tracked_item(&self, summary: &ItemSummary) -> TrackedItem {
        self.add_tracked_item(summary).await.unwrap()
    }

    pub async fn token_quote_count(&self) -> usize {
        self.state.lock().await.token_quotes.len()
    }
}

#[async_trait]
impl EconomyRepository for FakeRepository {
    async fn latest_token_quote(&self) -> anyhow::Result<Option<TokenQuote>> {
        let state = self.state.lock().await;
        Ok(state
            .token_quotes
            .iter()
            .max_by_key(|q| q.last_updated)
            .cloned())
    }

    async fn insert_token_quote(&self, quote: &TokenQuote) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        if state
            .token_quotes
            .iter()
            .any(|q| q.last_updated == quote.last_updated)
        {
            return Ok(false);
        }
        state.token_quotes.push(quote.clone());
        Ok(true)
    }

    async fn token_quotes_since(&self, since: i64) -> anyhow::Result<Vec<TokenQuote>> {
        let state = self.state.lock().await;
        let mut quotes: Vec<TokenQuote> = state
            .token_quotes
            .iter()
            .filter(|q| q.last_updated >= since)
            .cloned()
            .collect();
        quotes.sort_by_key(|q| q.last_updated);
        Ok(quotes)
    }

    async fn list_tracked_items(&self) -> anyhow::Result<Vec<TrackedItem>> {
        Ok(self.state.lock().await.tracked_items.clone())
    }

    async fn find_tracked_item(&self, item_id: i64) -> anyhow::Result<Option<TrackedItem>> {
        let state = self.state.lock().await;
        Ok(state
            .tracked_items
            .iter()
            .find(|t| t.item_id == item_id)
            .cloned())
    }

    async fn add_tracked_item(&self, summary: &ItemSummary) -> anyhow::Result<TrackedItem> {
        let mut state = self.state.lock().await;
        let tracked = TrackedItem {
            id: state.tracked_items.len() as i64 + 1,
            item_id: summary.item_id,
            name: summary.name.clone(),
            icon_url: summary.icon_url.clone(),
            quality: summary.quality.clone(),
        };
        state.tracked_items.push(tracked.clone());
        Ok(tracked)
    }

    async fn remove_tracked_item(&self, item_id: i64) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        let Some(pos) = state.tracked_items.iter().position(|t| t.item_id == item_id) else {
            return Ok(false);
        };
        let removed = state.tracked_items.remove(pos);
        state.item_quotes.retain(|q| q.tracked_id != removed.id);
        Ok(true)
    }

    async fn latest_item_quote(&self, tracked_id: i64) -> anyhow::Result<Option<ItemQuote>> {
        let state = self.state.lock().await;
        Ok(state
            .item_quotes
            .iter()
            .filter(|q| q.tracked_id == tracked_id)
            .max_by_key(|q| q.recorded_at)
            .cloned())
    }

    async fn insert_item_quotes(&self, quotes: &[ItemQuote]) -> anyhow::Result<()> {
        self.state.lock().await.item_quotes.extend_from_slice(quotes);
        Ok(())
    }

    async fn item_quotes_since(
        &self,
        tracked_id: i64,
        since: i64,
    ) -> anyhow::Result<Vec<ItemQuote>> {
        let state = self.state.lock().await;
        let mut quotes: Vec<ItemQuote> = state
            .item_quotes
            .iter()
            .filter(|q| q.tracked_id == tracked_id && q.recorded_at >= since)
            .cloned()
            .collect();
        quotes.sort_by_key(|q| q.recorded_at);
        Ok(quotes)
    }

    async fn list_characters(&self) -> anyhow::Result<Vec<Character>> {
        let mut characters = self.state.lock().await.characters.clone();
        characters.sort_by_key(|c| std::cmp::Reverse(c.level));
        Ok(characters)
    }

    async fn upsert_character(&self, character: &Character) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        match state
            .characters
            .iter_mut()
            .find(|c| c.blizzard_id == character.blizzard_id)
        {
            Some(existing) => *existing = character.clone(),
            None => state.characters.push(character.clone()),
        }
        Ok(())
    }

    async fn insert_gold_snapshot(&self, snapshot: &GoldSnapshot) -> anyhow::Result<()> {
        self.state.lock().await.gold_snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn gold_snapshots_since(&self, since: i64) -> anyhow::Result<Vec<GoldSnapshot>> {
        let state = self.state.lock().await;
        let mut snapshots: Vec<GoldSnapshot> = state
            .gold_snapshots
            .iter()
            .filter(|s| s.recorded_at >= since)
            .cloned()
            .collect();
        snapshots.sort_by_key(|s| s.recorded_at);
        Ok(snapshots)
    }
}

#[derive(Default)]
struct FeedState {
    token_quote: Option<TokenQuote>,
    listings: Vec<CommodityListing>,
    summaries: HashMap<i64, ItemSummary>,
    characters: Vec<Character>,
    commodity_calls: usize,
}

#[derive(Default)]
pub struct FakeFeed {
    state: Mutex<FeedState>,
}

impl FakeFeed {
    pub async fn set_token_quote(&self, quote: TokenQuote) {
        self.state.lock().await.token_quote = Some(quote);
    }

    pub async fn set_commodity_listings(&self, listings: Vec<CommodityListing>) {
        self.state.lock().await.listings = listings;
    }

    pub async fn set_item_summary(&self, summary: ItemSummary) {
        self.state
            .lock()
            .await
            .summaries
            .insert(summary.item_id, summary);
    }

    pub async fn set_characters(&self, characters: Vec<Character>) {
        self.state.lock().await.characters = characters;
    }

    pub async fn commodity_calls(&self) -> usize {
        self.state.lock().await.commodity_calls
    }
}

#[async_trait]
impl MarketFeed for FakeFeed {
    async fn token_quote(&self) -> anyhow::Result<TokenQuote> {
        self.state
            .lock()
            .await
            .token_quote
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no token quote configured"))
    }

    async fn commodity_listings(&self) -> anyhow::Result<Vec<CommodityListing>> {
        let mut state = self.state.lock().await;
        state.commodity_calls += 1;
        Ok(state.listings.clone())
    }

    async fn item_summary(&self, item_id: i64) -> anyhow::Result<Option<ItemSummary>> {
        Ok(self.state.lock().await.summaries.get(&item_id).cloned())
    }

    async fn account_characters(&self, _profile_token: &str) -> anyhow::Result<Vec<Character>> {
        Ok(self.state.lock().await.characters.clone())
    }
}
