pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<db::Store>,
    pub config: config::AppConfig,
}

impl AppState {
    pub fn new(store: db::Store, config: config::AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }
}
