use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::FileStore;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and store are handles, the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: becs_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Local file storage for task submissions and templates.
    pub storage: FileStore,
}

impl AppState {
    pub fn new(pool: becs_db::DbPool, config: ServerConfig) -> Self {
        let storage = FileStore::new(config.storage_root.clone());
        Self {
            pool,
            config: Arc::new(config),
            storage,
        }
    }
}
