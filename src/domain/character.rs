// Character roster domain models
use serde::Serialize;

/// A locally-synced World of Warcraft character. `gold` is raw copper.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Character {
    pub blizzard_id: i64,
    pub name: String,
    pub realm: String,
    pub class_name: Option<String>,
    pub level: i64,
    pub gold: i64,
    pub last_updated: i64,
}

/// The full roster plus the combined gold across all characters.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub total_gold: i64,
    pub characters: Vec<Character>,
}

impl Roster {
    pub fn new(characters: Vec<Character>) -> Self {
        let total_gold = characters.iter().map(|c| c.gold).sum();
        Self {
            total_gold,
            characters,
        }
    }
}

/// One snapshot of the summed roster gold, taken after a roster refresh.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GoldSnapshot {
    pub total_gold: i64,
    pub recorded_at: i64,
}
