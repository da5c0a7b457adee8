// Chart payload reduction - shared by the token, item and gold history endpoints
use serde::Serialize;

/// One timestamped price sample, the unit of every chart payload.
///
/// `timestamp` is epoch seconds, `price` is raw copper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub price: i64,
    #[serde(rename = "last_updated_timestamp")]
    pub timestamp: i64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: i64) -> Self {
        Self { price, timestamp }
    }
}

/// Reduce a dense series to at most one sample per fixed-width bucket.
///
/// Buckets are aligned to epoch zero, not to the query window, so a sample
/// lands on the same bucket boundary no matter which lookback the caller
/// picked. Within each bucket the first sample wins; buckets nobody hit are
/// simply absent. `bucket_secs == 0` means no aggregation.
///
/// The input must already be filtered to the window and sorted ascending by
/// timestamp. Unsorted input is not detected and produces extra points.
///
/// Note the boundary: `last_bucket` starts at 0 and emission requires a
/// strictly greater bucket key, so a sample whose bucket key is 0 (timestamp
/// inside the first epoch-aligned bucket) is never emitted. Downstream charts
/// rely on the current output, so keep it that way.
pub fn downsample(points: Vec<PricePoint>, bucket_secs: i64) -> Vec<PricePoint> {
    if bucket_secs == 0 || points.is_empty() {
        return points;
    }

    let mut kept = Vec::new();
    let mut last_bucket = 0;
    for point in points {
        let bucket = (point.timestamp / bucket_secs) * bucket_secs;
        if bucket > last_bucket {
            kept.push(point);
            last_bucket = bucket;
        }
    }
    kept
}

/// Named lookback window plus the bucket width used to thin its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRange {
    Day,
    Week,
    Fortnight,
    Month,
}

impl ChartRange {
    /// Resolve a range token, falling back instead of erroring so the
    /// endpoints stay total over arbitrary query strings.
    pub fn parse(token: &str, fallback: ChartRange) -> ChartRange {
        match token {
            "24h" => ChartRange::Day,
            "7d" => ChartRange::Week,
            "14d" => ChartRange::Fortnight,
            "30d" => ChartRange::Month,
            _ => fallback,
        }
    }

    pub fn lookback_secs(self) -> i64 {
        match self {
            ChartRange::Day => 24 * 3600,
            ChartRange::Week => 7 * 86_400,
            ChartRange::Fortnight => 14 * 86_400,
            ChartRange::Month => 30 * 86_400,
        }
    }

    /// Bucket width in seconds; 0 for the 24h range, where raw density is
    /// already acceptable.
    pub fn bucket_secs(self) -> i64 {
        match self {
            ChartRange::Day => 0,
            ChartRange::Week => 3600,
            ChartRange::Fortnight => 7200,
            ChartRange::Month => 14_400,
        }
    }
}
