use std::sync::Arc;

use crate::{config::Config, store::CatalogStore};

/// Shared application state.
///
/// The catalog is immutable after startup, so it is shared without a lock.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(catalog: CatalogStore, config: Config) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}
