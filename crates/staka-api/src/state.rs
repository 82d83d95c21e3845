use staka_core::Config;
use staka_db::{FileStore, TariffStore};
use staka_storage::Storage;
use std::sync::Arc;

/// Shared state handed to every handler.
///
/// Stores are trait objects so the router can run over Postgres in production and
/// over in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tariffs: Arc<dyn TariffStore>,
    pub files: Arc<dyn FileStore>,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(
        config: Config,
        tariffs: Arc<dyn TariffStore>,
        files: Arc<dyn FileStore>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            tariffs,
            files,
            storage,
        }
    }
}
