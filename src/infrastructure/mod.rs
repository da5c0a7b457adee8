// Infrastructure layer - External dependencies and adapters
pub mod battlenet;
pub mod config;
pub mod sqlite_repository;
