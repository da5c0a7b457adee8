// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::collector::PriceCollector;
use crate::application::history_service::HistoryService;
use crate::application::roster_service::RosterService;
use crate::application::watchlist_service::WatchlistService;
use crate::infrastructure::battlenet::BattleNetClient;
use crate::infrastructure::config::load_config;
use crate::infrastructure::sqlite_repository::SqliteRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_watch_item, characters, gold_history, health, item_history, latest_token, list_watchlist,
    remove_watch_item, token_history,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    let credentials_present = config.battlenet.credentials_present();
    if !credentials_present {
        warn!("Battle.net API credentials not configured; price polling is disabled");
    }

    // Storage (infrastructure layer)
    let repository = Arc::new(SqliteRepository::connect(&config.database.url).await?);
    repository.init_schema().await?;

    // Upstream market feed, constructed once and passed down
    let feed = Arc::new(BattleNetClient::new(
        config.battlenet.client_id.clone(),
        config.battlenet.client_secret.clone(),
        config.battlenet.region.clone(),
    ));

    // Background collector loop
    let collector = Arc::new(PriceCollector::new(
        repository.clone(),
        feed.clone(),
        Duration::from_secs(config.collector.poll_interval_secs),
        config.battlenet.profile_token.clone(),
        credentials_present,
    ));
    tokio::spawn(collector.clone().run());

    // Services (application layer)
    let state = Arc::new(AppState {
        history_service: HistoryService::new(repository.clone()),
        watchlist_service: WatchlistService::new(repository.clone(), feed.clone()),
        roster_service: RosterService::new(repository.clone()),
        collector,
        credentials_present,
    });

    // Router (presentation layer); CORS stays permissive for the browser
    // client on another origin
    let router = Router::new()
        .route("/", get(health))
        .route("/api/token/latest", get(latest_token))
        .route("/api/token/history", get(token_history))
        .route("/api/items", get(list_watchlist).post(add_watch_item))
        .route("/api/items/:item_id", delete(remove_watch_item))
        .route("/api/items/:item_id/history", get(item_history))
        .route("/api/characters", get(characters))
        .route("/api/gold/history", get(gold_history))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    info!("Starting warcraft-economy service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
