// Application layer - Use cases and ports
pub mod collector;
pub mod economy_repository;
pub mod history_service;
pub mod market_feed;
pub mod roster_service;
pub mod watchlist_service;

#[cfg(test)]
pub mod testing;
