//! API module - HTTP handlers and routing.

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::services::asset_service::AssetService;
use crate::services::resolution_service::ResolutionService;
use crate::storage::BlobStorage;
use crate::store::ReleaseStore;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ReleaseStore>,
    pub storage: Arc<dyn BlobStorage>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ReleaseStore>, storage: Arc<dyn BlobStorage>) -> Self {
        Self {
            config,
            store,
            storage,
        }
    }

    /// Create a ResolutionService over the shared store.
    pub fn resolution_service(&self) -> ResolutionService {
        ResolutionService::new(self.store.clone())
    }

    /// Create an AssetService over the shared store and blob storage.
    pub fn asset_service(&self) -> AssetService {
        AssetService::new(self.store.clone(), self.storage.clone())
    }
}

pub type SharedState = Arc<AppState>;
