// Background price collector - the single poll loop of the system
use crate::application::economy_repository::EconomyRepository;
use crate::application::market_feed::{CommodityListing, MarketFeed};
use crate::domain::character::GoldSnapshot;
use crate::domain::item::ItemQuote;
use crate::domain::token::format_gold;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Periodically pulls token, commodity and roster data from the feed into
/// the repository. Errors are logged and the loop keeps going.
pub struct PriceCollector {
    repository: Arc<dyn EconomyRepository>,
    feed: Arc<dyn MarketFeed>,
    poll_interval: Duration,
    profile_token: Option<String>,
    credentials_present: bool,
}

impl PriceCollector {
    pub fn new(
        repository: Arc<dyn EconomyRepository>,
        feed: Arc<dyn MarketFeed>,
        poll_interval: Duration,
        profile_token: Option<String>,
        credentials_present: bool,
    ) -> Self {
        Self {
            repository,
            feed,
            poll_interval,
            profile_token,
            credentials_present,
        }
    }

    pub async fn run(self: Arc<Self>) {
        info!(
            "Price collector started (interval: {}s)",
            self.poll_interval.as_secs()
        );
        loop {
            self.collect_once().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One poll cycle: token price, commodity prices, then the roster when a
    /// profile token is configured.
    pub async fn collect_once(&self) {
        if !self.credentials_present {
            warn!("Missing Battle.net API credentials, skipping poll cycle");
            return;
        }

        if let Err(e) = self.refresh_token_price().await {
            error!("Token price update failed: {e:#}");
        }
        if let Err(e) = self.refresh_commodities().await {
            error!("Commodity price update failed: {e:#}");
        }
        if let Some(token) = self.profile_token.clone() {
            if let Err(e) = self.refresh_roster(&token).await {
                error!("Roster refresh failed: {e:#}");
            }
        }
    }

    async fn refresh_token_price(&self) -> anyhow::Result<()> {
        let quote = self.feed.token_quote().await?;
        if self.repository.insert_token_quote(&quote).await? {
            info!(
                "Token price updated: {} ({})",
                format_gold(quote.price),
                quote.region
            );
        } else {
            debug!("Token price already up to date");
        }
        Ok(())
    }

    /// Pull one commodity snapshot and record the lowest listed price for
    /// every tracked item. Public so the watchlist handler can trigger it
    /// right after adding an item.
    pub async fn refresh_commodities(&self) -> anyhow::Result<()> {
        let tracked = self.repository.list_tracked_items().await?;
        if tracked.is_empty() {
            debug!("No tracked items, skipping commodity update");
            return Ok(());
        }

        let listings = self.feed.commodity_listings().await?;
        let tracked_ids: HashSet<i64> = tracked.iter().map(|t| t.item_id).collect();
        info!(
            "Processing {} auctions for {} tracked items",
            listings.len(),
            tracked_ids.len()
        );

        let lowest = lowest_unit_prices(&listings, &tracked_ids);
        let now = Utc::now().timestamp();

        let mut quotes = Vec::new();
        for item in &tracked {
            if let Some(&buyout) = lowest.get(&item.item_id) {
                info!("Updated {}: {}", item.name, format_gold(buyout));
                quotes.push(ItemQuote {
                    tracked_id: item.id,
                    buyout,
                    quantity: 1,
                    recorded_at: now,
                });
            }
        }

        if !quotes.is_empty() {
            self.repository.insert_item_quotes(&quotes).await?;
        }
        Ok(())
    }

    async fn refresh_roster(&self, profile_token: &str) -> anyhow::Result<()> {
        let characters = self.feed.account_characters(profile_token).await?;
        if characters.is_empty() {
            debug!("Roster refresh returned no characters");
            return Ok(());
        }

        let total_gold = characters.iter().map(|c| c.gold).sum();
        for character in &characters {
            self.repository.upsert_character(character).await?;
        }
        self.repository
            .insert_gold_snapshot(&GoldSnapshot {
                total_gold,
                recorded_at: Utc::now().timestamp(),
            })
            .await?;

        info!(
            "Roster refreshed: {} characters, {} total",
            characters.len(),
            format_gold(total_gold)
        );
        Ok(())
    }
}

/// Lowest positive unit price per tracked item across the full snapshot.
pub fn lowest_unit_prices(
    listings: &[CommodityListing],
    tracked_ids: &HashSet<i64>,
) -> HashMap<i64, i64> {
    let mut lowest = HashMap::new();
    for listing in listings {
        if listing.unit_price <= 0 || !tracked_ids.contains(&listing.item_id) {
            continue;
        }
        lowest
            .entry(listing.item_id)
            .and_modify(|price| {
                if listing.unit_price < *price {
                    *price = listing.unit_price;
                }
            })
            .or_insert(listing.unit_price);
    }
    lowest
}
