// WoW Token domain model
use serde::Serialize;

/// One WoW Token price quote as reported upstream.
///
/// `last_updated` is the upstream quote timestamp in epoch seconds; the
/// poller may observe the same quote repeatedly, so it doubles as the
/// dedup key.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TokenQuote {
    pub price: i64,
    pub last_updated: i64,
    pub region: String,
}

/// Render a raw copper amount as a whole-gold display string, e.g.
/// `1234567890` -> `"123,457g"`.
pub fn format_gold(copper: i64) -> String {
    let gold = (copper as f64 / 10_000.0).round() as i64;
    let digits = gold.abs().to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if gold < 0 {
        format!("-{}g", grouped)
    } else {
        format!("{}g", grouped)
    }
}
