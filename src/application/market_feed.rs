// Feed trait for the upstream market API
use crate::domain::character::Character;
use crate::domain::item::ItemSummary;
use crate::domain::token::TokenQuote;
use async_trait::async_trait;

/// One commodity auction as listed in the region-wide snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityListing {
    pub item_id: i64,
    /// Effective unit price in copper; 0 when the auction carried neither a
    /// unit price nor a buyout.
    pub unit_price: i64,
    pub quantity: i64,
}

/// Upstream market data port, implemented by the Battle.net client.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Current WoW Token quote for the configured region.
    async fn token_quote(&self) -> anyhow::Result<TokenQuote>;

    /// The full region-wide commodity auction snapshot. Large; callers are
    /// expected to reduce it in one pass.
    async fn commodity_listings(&self) -> anyhow::Result<Vec<CommodityListing>>;

    /// Static catalog details plus icon for an item, or `None` when the item
    /// id is unknown upstream.
    async fn item_summary(&self, item_id: i64) -> anyhow::Result<Option<ItemSummary>>;

    /// All characters on the account behind `profile_token`, gold included.
    /// Characters whose profile no longer resolves are filtered out.
    async fn account_characters(&self, profile_token: &str) -> anyhow::Result<Vec<Character>>;
}
