// Application state for HTTP handlers
use crate::application::collector::PriceCollector;
use crate::application::history_service::HistoryService;
use crate::application::roster_service::RosterService;
use crate::application::watchlist_service::WatchlistService;
use std::sync::Arc;

pub struct AppState {
    pub history_service: HistoryService,
    pub watchlist_service: WatchlistService,
    pub roster_service: RosterService,
    /// Kept around so adding a watchlist item can trigger an immediate
    /// price refresh instead of waiting for the next poll cycle.
    pub collector: Arc<PriceCollector>,
    pub credentials_present: bool,
}
