// Tracked item domain models
use serde::Serialize;

/// A commodity on the user's watchlist. `id` is the local row id,
/// `item_id` the upstream Blizzard item id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackedItem {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub icon_url: Option<String>,
    pub quality: Option<String>,
}

/// Catalog details for an item as resolved upstream, before it is tracked.
#[derive(Debug, Clone)]
pub struct ItemSummary {
    pub item_id: i64,
    pub name: String,
    pub quality: Option<String>,
    pub icon_url: Option<String>,
}

/// One recorded auction-house price for a tracked item.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemQuote {
    pub tracked_id: i64,
    pub buyout: i64,
    pub quantity: i64,
    pub recorded_at: i64,
}

/// Watchlist row shape served to the frontend: the tracked item joined with
/// its most recent quote, zeros when no price has been recorded yet.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistEntry {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub icon_url: Option<String>,
    pub quality: Option<String>,
    pub current_price: i64,
    pub last_updated: Option<i64>,
}

impl WatchlistEntry {
    pub fn new(item: TrackedItem, latest: Option<&ItemQuote>) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            name: item.name,
            icon_url: item.icon_url,
            quality: item.quality,
            current_price: latest.map(|q| q.buyout).unwrap_or(0),
            last_updated: latest.map(|q| q.recorded_at),
        }
    }
}
