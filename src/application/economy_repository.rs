// Repository trait for all locally stored economy data
use crate::domain::character::{Character, GoldSnapshot};
use crate::domain::item::{ItemQuote, ItemSummary, TrackedItem};
use crate::domain::token::TokenQuote;
use async_trait::async_trait;

/// Storage port for price history, the watchlist and the character roster.
///
/// Every `*_since` query filters `timestamp >= since` and returns rows
/// sorted ascending - the contract the downsampler expects.
#[async_trait]
pub trait EconomyRepository: Send + Sync {
    async fn latest_token_quote(&self) -> anyhow::Result<Option<TokenQuote>>;

    /// Insert a quote unless one with the same upstream timestamp already
    /// exists. Returns whether a row was written.
    async fn insert_token_quote(&self, quote: &TokenQuote) -> anyhow::Result<bool>;

    async fn token_quotes_since(&self, since: i64) -> anyhow::Result<Vec<TokenQuote>>;

    async fn list_tracked_items(&self) -> anyhow::Result<Vec<TrackedItem>>;

    async fn find_tracked_item(&self, item_id: i64) -> anyhow::Result<Option<TrackedItem>>;

    async fn add_tracked_item(&self, summary: &ItemSummary) -> anyhow::Result<TrackedItem>;

    /// Remove a tracked item and its recorded quotes. Returns whether the
    /// item existed.
    async fn remove_tracked_item(&self, item_id: i64) -> anyhow::Result<bool>;

    async fn latest_item_quote(&self, tracked_id: i64) -> anyhow::Result<Option<ItemQuote>>;

    async fn insert_item_quotes(&self, quotes: &[ItemQuote]) -> anyhow::Result<()>;

    async fn item_quotes_since(
        &self,
        tracked_id: i64,
        since: i64,
    ) -> anyhow::Result<Vec<ItemQuote>>;

    /// Characters ordered by level descending, the roster display order.
    async fn list_characters(&self) -> anyhow::Result<Vec<Character>>;

    async fn upsert_character(&self, character: &Character) -> anyhow::Result<()>;

    async fn insert_gold_snapshot(&self, snapshot: &GoldSnapshot) -> anyhow::Result<()>;

    async fn gold_snapshots_since(&self, since: i64) -> anyhow::Result<Vec<GoldSnapshot>>;
}
