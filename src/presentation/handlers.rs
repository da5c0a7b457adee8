// HTTP request handlers
use crate::application::watchlist_service::WatchlistError;
use crate::domain::character::Roster;
use crate::domain::chart::PricePoint;
use crate::domain::item::{TrackedItem, WatchlistEntry};
use crate::domain::token::format_gold;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub configured: bool,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        message: "warcraft-economy backend is running",
        configured: state.credentials_present,
    })
}

#[derive(Serialize)]
pub struct LatestTokenResponse {
    pub price: i64,
    pub last_updated: i64,
    pub formatted: String,
}

/// Latest WoW Token quote; zeros when nothing has been recorded yet.
pub async fn latest_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestTokenResponse>, ApiError> {
    let response = match state.history_service.latest_token().await? {
        Some(quote) => LatestTokenResponse {
            price: quote.price,
            last_updated: quote.last_updated,
            formatted: format_gold(quote.price),
        },
        None => LatestTokenResponse {
            price: 0,
            last_updated: 0,
            formatted: "0g".to_string(),
        },
    };
    Ok(Json(response))
}

pub async fn token_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let range = query.range.as_deref().unwrap_or("24h");
    let points = state.history_service.token_history(range).await?;
    Ok(Json(points))
}

/// The watchlist with each item's latest recorded price.
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WatchlistEntry>>, ApiError> {
    let entries = state.watchlist_service.watchlist().await?;
    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct TrackRequest {
    pub item_id: i64,
}

/// Add an item to the watchlist and kick off an immediate price refresh so
/// it does not sit priceless until the next poll cycle.
pub async fn add_watch_item(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrackRequest>,
) -> Result<Json<TrackedItem>, ApiError> {
    let tracked = state
        .watchlist_service
        .track(request.item_id)
        .await
        .map_err(|e| match e {
            WatchlistError::AlreadyTracked => ApiError::BadRequest(e.to_string()),
            WatchlistError::UnknownItem => ApiError::NotFound(e.to_string()),
            WatchlistError::Other(inner) => ApiError::Internal(inner),
        })?;

    let collector = state.collector.clone();
    tokio::spawn(async move {
        if let Err(e) = collector.refresh_commodities().await {
            error!("Post-add commodity refresh failed: {e:#}");
        }
    });

    Ok(Json(tracked))
}

pub async fn remove_watch_item(
    Path(item_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    if !state.watchlist_service.untrack(item_id).await? {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }
    Ok(Json(json!({ "message": "Item deleted" })))
}

pub async fn item_history(
    Path(item_id): Path<i64>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let range = query.range.as_deref().unwrap_or("14d");
    let points = state
        .history_service
        .item_history(item_id, range)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not tracked".to_string()))?;
    Ok(Json(points))
}

/// Synced characters plus the combined gold across the account.
pub async fn characters(State(state): State<Arc<AppState>>) -> Result<Json<Roster>, ApiError> {
    let roster = state.roster_service.roster().await?;
    Ok(Json(roster))
}

pub async fn gold_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let range = query.range.as_deref().unwrap_or("14d");
    let points = state.history_service.gold_history(range).await?;
    Ok(Json(points))
}
