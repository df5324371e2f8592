use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::StorageConfig;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageConfig>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            storage: Arc::new(StorageConfig::new(config.data_dir.clone())),
            config: Arc::new(config),
        }
    }
}
