// Battle.net API client implementing the market feed port
use crate::application::market_feed::{CommodityListing, MarketFeed};
use crate::domain::character::Character;
use crate::domain::item::ItemSummary;
use crate::domain::token::TokenQuote;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

pub struct BattleNetClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    region: String,
    cached_token: Mutex<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenIndexResponse {
    price: i64,
    /// Upstream reports milliseconds.
    last_updated_timestamp: i64,
}

impl TokenIndexResponse {
    fn into_quote(self, region: &str) -> TokenQuote {
        TokenQuote {
            price: self.price,
            last_updated: self.last_updated_timestamp / 1000,
            region: region.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommoditySnapshot {
    #[serde(default)]
    auctions: Vec<AuctionEntry>,
}

#[derive(Debug, Deserialize)]
struct AuctionEntry {
    item: AuctionItem,
    unit_price: Option<i64>,
    buyout: Option<i64>,
    quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AuctionItem {
    id: i64,
}

impl AuctionEntry {
    /// Commodities list a unit price; the occasional entry only carries a
    /// buyout. Neither present maps to 0 and is filtered downstream.
    fn into_listing(self) -> CommodityListing {
        CommodityListing {
            item_id: self.item.id,
            unit_price: self.unit_price.or(self.buyout).unwrap_or(0),
            quantity: self.quantity.unwrap_or(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemDetails {
    id: i64,
    name: String,
    quality: Option<QualityRef>,
}

#[derive(Debug, Deserialize)]
struct QualityRef {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ItemMedia {
    #[serde(default)]
    assets: Vec<MediaAsset>,
}

#[derive(Debug, Deserialize)]
struct MediaAsset {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ProfileSummary {
    #[serde(default)]
    wow_accounts: Vec<WowAccount>,
}

impl ProfileSummary {
    fn characters(self) -> Vec<ProfileCharacter> {
        self.wow_accounts
            .into_iter()
            .flat_map(|a| a.characters)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct WowAccount {
    #[serde(default)]
    characters: Vec<ProfileCharacter>,
}

#[derive(Debug, Deserialize)]
struct ProfileCharacter {
    id: i64,
    name: String,
    realm: RealmRef,
    level: Option<i64>,
    playable_class: Option<ClassRef>,
}

#[derive(Debug, Deserialize)]
struct RealmRef {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ClassRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProtectedProfile {
    money: Option<i64>,
}

impl BattleNetClient {
    pub fn new(client_id: String, client_secret: String, region: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            region,
            cached_token: Mutex::new(None),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("https://{}.api.blizzard.com{}", self.region, path)
    }

    /// Client-credentials token, cached until shortly before expiry.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached_token.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if now < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let url = format!("https://{}.battle.net/oauth/token", self.region);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to reach the Battle.net OAuth endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to get access token: {} - {}", status, body);
        }

        let token: OAuthTokenResponse = response
            .json()
            .await
            .context("Failed to parse OAuth token response")?;

        let expires_at = now + token.expires_in - 60;
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    /// GET with the cached client token. `None` on 404.
    async fn get_api<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let token = self.access_token().await?;
        self.get_with_bearer(url, &token).await
    }

    async fn get_with_bearer<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: &str,
    ) -> Result<Option<T>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to Battle.net")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Battle.net request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<T>()
            .await
            .context("Failed to parse Battle.net response")?;
        Ok(Some(data))
    }
}

#[async_trait]
impl MarketFeed for BattleNetClient {
    async fn token_quote(&self) -> Result<TokenQuote> {
        let url = self.api_url(&format!(
            "/data/wow/token/index?namespace=dynamic-{}",
            self.region
        ));
        let index: TokenIndexResponse = self
            .get_api(&url)
            .await?
            .context("Token index endpoint returned no data")?;
        Ok(index.into_quote(&self.region))
    }

    async fn commodity_listings(&self) -> Result<Vec<CommodityListing>> {
        let url = self.api_url(&format!(
            "/data/wow/auctions/commodities?namespace=dynamic-{}&locale=en_US",
            self.region
        ));
        let snapshot: CommoditySnapshot = self
            .get_api(&url)
            .await?
            .context("Commodity snapshot endpoint returned no data")?;
        Ok(snapshot
            .auctions
            .into_iter()
            .map(AuctionEntry::into_listing)
            .collect())
    }

    async fn item_summary(&self, item_id: i64) -> Result<Option<ItemSummary>> {
        let url = self.api_url(&format!(
            "/data/wow/item/{}?namespace=static-{}&locale=en_US",
            item_id, self.region
        ));
        let Some(details) = self.get_api::<ItemDetails>(&url).await? else {
            return Ok(None);
        };

        // Icon lookup is best-effort; a tracked item without an icon is fine.
        let media_url = self.api_url(&format!(
            "/data/wow/media/item/{}?namespace=static-{}",
            item_id, self.region
        ));
        let icon_url = match self.get_api::<ItemMedia>(&media_url).await {
            Ok(Some(media)) => media.assets.into_iter().next().map(|a| a.value),
            Ok(None) => None,
            Err(e) => {
                debug!("Item media lookup failed for {}: {e:#}", item_id);
                None
            }
        };

        Ok(Some(ItemSummary {
            item_id: details.id,
            name: details.name,
            quality: details.quality.map(|q| q.kind),
            icon_url,
        }))
    }

    async fn account_characters(&self, profile_token: &str) -> Result<Vec<Character>> {
        let url = self.api_url(&format!(
            "/profile/user/wow?namespace=profile-{}&locale=en_US",
            self.region
        ));
        let summary: ProfileSummary = self
            .get_with_bearer(&url, profile_token)
            .await?
            .context("Account profile endpoint returned no data")?;

        let now = Utc::now().timestamp();
        let mut characters = Vec::new();
        for profile in summary.characters() {
            let protected_url = self.api_url(&format!(
                "/profile/user/wow/protected-character/{}-{}?namespace=profile-{}&locale=en_US",
                profile.realm.id, profile.id, self.region
            ));
            // Deleted or transferred characters still show up in the summary
            // but their profile 404s; skip those ghosts.
            let Some(protected) = self
                .get_with_bearer::<ProtectedProfile>(&protected_url, profile_token)
                .await?
            else {
                debug!("Skipping ghost character {}", profile.name);
                continue;
            };

            characters.push(Character {
                blizzard_id: profile.id,
                name: profile.name,
                realm: profile.realm.name,
                class_name: profile.playable_class.map(|c| c.name),
                level: profile.level.unwrap_or(0),
                gold: protected.money.unwrap_or(0),
                last_updated: now,
            });
        }
        Ok(characters)
    }
}
