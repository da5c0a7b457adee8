// SQLite repository implementation
use crate::application::economy_repository::EconomyRepository;
use crate::domain::character::{Character, GoldSnapshot};
use crate::domain::item::{ItemQuote, ItemSummary, TrackedItem};
use crate::domain::token::TokenQuote;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS token_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        price INTEGER NOT NULL,
        last_updated INTEGER NOT NULL UNIQUE,
        region TEXT NOT NULL DEFAULT 'eu'
    )",
    "CREATE TABLE IF NOT EXISTS tracked_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        icon_url TEXT,
        quality TEXT
    )",
    "CREATE TABLE IF NOT EXISTS item_price_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tracked_id INTEGER NOT NULL REFERENCES tracked_items(id),
        buyout INTEGER NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 1,
        recorded_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_item_price_history_tracked
        ON item_price_history(tracked_id, recorded_at)",
    "CREATE TABLE IF NOT EXISTS characters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        blizzard_id INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        realm TEXT NOT NULL,
        class_name TEXT,
        level INTEGER NOT NULL DEFAULT 0,
        gold INTEGER NOT NULL DEFAULT 0,
        last_updated INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS account_gold_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        total_gold INTEGER NOT NULL,
        recorded_at INTEGER NOT NULL
    )",
];

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {url}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open database")?;
        Ok(Self { pool })
    }

    /// Create any missing tables. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to initialize database schema")?;
        }
        Ok(())
    }
}

#[async_trait]
impl EconomyRepository for SqliteRepository {
    async fn latest_token_quote(&self) -> Result<Option<TokenQuote>> {
        let quote = sqlx::query_as::<_, TokenQuote>(
            "SELECT price, last_updated, region FROM token_history
             ORDER BY last_updated DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    async fn insert_token_quote(&self, quote: &TokenQuote) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO token_history (price, last_updated, region)
             VALUES (?, ?, ?)",
        )
        .bind(quote.price)
        .bind(quote.last_updated)
        .bind(&quote.region)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn token_quotes_since(&self, since: i64) -> Result<Vec<TokenQuote>> {
        let quotes = sqlx::query_as::<_, TokenQuote>(
            "SELECT price, last_updated, region FROM token_history
             WHERE last_updated >= ? ORDER BY last_updated ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    async fn list_tracked_items(&self) -> Result<Vec<TrackedItem>> {
        let items = sqlx::query_as::<_, TrackedItem>(
            "SELECT id, item_id, name, icon_url, quality FROM tracked_items ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn find_tracked_item(&self, item_id: i64) -> Result<Option<TrackedItem>> {
        let item = sqlx::query_as::<_, TrackedItem>(
            "SELECT id, item_id, name, icon_url, quality FROM tracked_items WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn add_tracked_item(&self, summary: &ItemSummary) -> Result<TrackedItem> {
        let result = sqlx::query(
            "INSERT INTO tracked_items (item_id, name, icon_url, quality) VALUES (?, ?, ?, ?)",
        )
        .bind(summary.item_id)
        .bind(&summary.name)
        .bind(&summary.icon_url)
        .bind(&summary.quality)
        .execute(&self.pool)
        .await?;

        Ok(TrackedItem {
            id: result.last_insert_rowid(),
            item_id: summary.item_id,
            name: summary.name.clone(),
            icon_url: summary.icon_url.clone(),
            quality: summary.quality.clone(),
        })
    }

    async fn remove_tracked_item(&self, item_id: i64) -> Result<bool> {
        let Some(item) = self.find_tracked_item(item_id).await? else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM item_price_history WHERE tracked_id = ?")
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tracked_items WHERE id = ?")
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn latest_item_quote(&self, tracked_id: i64) -> Result<Option<ItemQuote>> {
        let quote = sqlx::query_as::<_, ItemQuote>(
            "SELECT tracked_id, buyout, quantity, recorded_at FROM item_price_history
             WHERE tracked_id = ? ORDER BY recorded_at DESC LIMIT 1",
        )
        .bind(tracked_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    async fn insert_item_quotes(&self, quotes: &[ItemQuote]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for quote in quotes {
            sqlx::query(
                "INSERT INTO item_price_history (tracked_id, buyout, quantity, recorded_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(quote.tracked_id)
            .bind(quote.buyout)
            .bind(quote.quantity)
            .bind(quote.recorded_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn item_quotes_since(&self, tracked_id: i64, since: i64) -> Result<Vec<ItemQuote>> {
        let quotes = sqlx::query_as::<_, ItemQuote>(
            "SELECT tracked_id, buyout, quantity, recorded_at FROM item_price_history
             WHERE tracked_id = ? AND recorded_at >= ? ORDER BY recorded_at ASC",
        )
        .bind(tracked_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    async fn list_characters(&self) -> Result<Vec<Character>> {
        let characters = sqlx::query_as::<_, Character>(
            "SELECT blizzard_id, name, realm, class_name, level, gold, last_updated
             FROM characters ORDER BY level DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(characters)
    }

    async fn upsert_character(&self, character: &Character) -> Result<()> {
        sqlx::query(
            "INSERT INTO characters (blizzard_id, name, realm, class_name, level, gold, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(blizzard_id) DO UPDATE SET
                 name = excluded.name,
                 realm = excluded.realm,
                 class_name = excluded.class_name,
                 level = excluded.level,
                 gold = excluded.gold,
                 last_updated = excluded.last_updated",
        )
        .bind(character.blizzard_id)
        .bind(&character.name)
        .bind(&character.realm)
        .bind(&character.class_name)
        .bind(character.level)
        .bind(character.gold)
        .bind(character.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_gold_snapshot(&self, snapshot: &GoldSnapshot) -> Result<()> {
        sqlx::query("INSERT INTO account_gold_history (total_gold, recorded_at) VALUES (?, ?)")
            .bind(snapshot.total_gold)
            .bind(snapshot.recorded_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn gold_snapshots_since(&self, since: i64) -> Result<Vec<GoldSnapshot>> {
        let snapshots = sqlx::query_as::<_, GoldSnapshot>(
            "SELECT total_gold, recorded_at FROM account_gold_history
             WHERE recorded_at >= ? ORDER BY recorded_at ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory database; one pooled connection, since every `:memory:`
    /// connection is its own database.
    async fn test_repository() -> SqliteRepository {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        let repository = SqliteRepository { pool };
        repository.init_schema().await.unwrap();
        repository
    }

    fn quote(last_updated: i64, price: i64) -> TokenQuote {
        TokenQuote {
            price,
            last_updated,
            region: "eu".to_string(),
        }
    }

    fn summary(item_id: i64, name: &str) -> ItemSummary {
        ItemSummary {
            item_id,
            name: name.to_string(),
            quality: Some("RARE".to_string()),
            icon_url: None,
        }
    }

    #[tokio::test]
    async fn token_quotes_dedup_on_timestamp() {
        let repo = test_repository().await;

        assert!(repo.insert_token_quote(&quote(1_700_000_000, 100)).await.unwrap());
        assert!(!repo.insert_token_quote(&quote(1_700_000_000, 999)).await.unwrap());
        assert!(repo.insert_token_quote(&quote(1_700_001_800, 110)).await.unwrap());

        let latest = repo.latest_token_quote().await.unwrap().unwrap();
        assert_eq!(latest.price, 110);

        let all = repo.token_quotes_since(0).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].last_updated < all[1].last_updated);
    }

    #[tokio::test]
    async fn token_window_filters_old_rows() {
        let repo = test_repository().await;
        repo.insert_token_quote(&quote(100, 1)).await.unwrap();
        repo.insert_token_quote(&quote(200, 2)).await.unwrap();
        repo.insert_token_quote(&quote(300, 3)).await.unwrap();

        let windowed = repo.token_quotes_since(200).await.unwrap();
        assert_eq!(windowed.len(), 2);
        assert_eq!(windowed[0].last_updated, 200);
    }

    #[tokio::test]
    async fn tracked_item_roundtrip() {
        let repo = test_repository().await;

        let tracked = repo.add_tracked_item(&summary(190_395, "Serevite Ore")).await.unwrap();
        assert!(tracked.id > 0);

        let found = repo.find_tracked_item(190_395).await.unwrap().unwrap();
        assert_eq!(found.id, tracked.id);
        assert_eq!(found.name, "Serevite Ore");
        assert_eq!(found.quality.as_deref(), Some("RARE"));

        assert_eq!(repo.list_tracked_items().await.unwrap().len(), 1);
        assert!(repo.find_tracked_item(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removing_an_item_drops_its_history() {
        let repo = test_repository().await;
        let tracked = repo.add_tracked_item(&summary(190_395, "Serevite Ore")).await.unwrap();
        repo.insert_item_quotes(&[ItemQuote {
            tracked_id: tracked.id,
            buyout: 500,
            quantity: 1,
            recorded_at: 1_700_000_000,
        }])
        .await
        .unwrap();

        assert!(repo.remove_tracked_item(190_395).await.unwrap());
        assert!(!repo.remove_tracked_item(190_395).await.unwrap());
        assert!(repo.find_tracked_item(190_395).await.unwrap().is_none());
        assert!(repo.item_quotes_since(tracked.id, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_item_quote_picks_newest() {
        let repo = test_repository().await;
        let tracked = repo.add_tracked_item(&summary(190_395, "Serevite Ore")).await.unwrap();
        repo.insert_item_quotes(&[
            ItemQuote {
                tracked_id: tracked.id,
                buyout: 500,
                quantity: 1,
                recorded_at: 1_700_000_000,
            },
            ItemQuote {
                tracked_id: tracked.id,
                buyout: 450,
                quantity: 1,
                recorded_at: 1_700_003_600,
            },
        ])
        .await
        .unwrap();

        let latest = repo.latest_item_quote(tracked.id).await.unwrap().unwrap();
        assert_eq!(latest.buyout, 450);

        let windowed = repo.item_quotes_since(tracked.id, 1_700_000_001).await.unwrap();
        assert_eq!(windowed.len(), 1);
    }

    #[tokio::test]
    async fn upsert_character_updates_in_place() {
        let repo = test_repository().await;
        let mut character = Character {
            blizzard_id: 42,
            name: "Aeryn".to_string(),
            realm: "Blackrock".to_string(),
            class_name: Some("Mage".to_string()),
            level: 70,
            gold: 100_000,
            last_updated: 1_700_000_000,
        };

        repo.upsert_character(&character).await.unwrap();
        character.level = 80;
        character.gold = 250_000;
        repo.upsert_character(&character).await.unwrap();

        let characters = repo.list_characters().await.unwrap();
        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].level, 80);
        assert_eq!(characters[0].gold, 250_000);
    }

    #[tokio::test]
    async fn characters_listed_by_level_descending() {
        let repo = test_repository().await;
        for (id, name, level) in [(1, "Lowbie", 20), (2, "Main", 80), (3, "Alt", 60)] {
            repo.upsert_character(&Character {
                blizzard_id: id,
                name: name.to_string(),
                realm: "Blackrock".to_string(),
                class_name: None,
                level,
                gold: 0,
                last_updated: 0,
            })
            .await
            .unwrap();
        }

        let characters = repo.list_characters().await.unwrap();
        let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Main", "Alt", "Lowbie"]);
    }

    #[tokio::test]
    async fn gold_snapshots_windowed_ascending() {
        let repo = test_repository().await;
        for (total_gold, recorded_at) in [(100, 10), (120, 20), (90, 30)] {
            repo.insert_gold_snapshot(&GoldSnapshot {
                total_gold,
                recorded_at,
            })
            .await
            .unwrap();
        }

        let snapshots = repo.gold_snapshots_since(15).await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].recorded_at, 20);
        assert_eq!(snapshots[1].total_gold, 90);
    }
}
