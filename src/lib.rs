pub mod api;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod spark;

use std::sync::Arc;

use cache::Cache;
use config::Config;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Cache,
}
