use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::{
    AppConfig, InMemoryInventoryStore, InventoryService, InventoryStore, SqliteInventoryStore,
};

/// Service handle shared by all handlers; the store is chosen at startup.
pub type AppServices = InventoryService<Arc<dyn InventoryStore>>;

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn InventoryStore> = match &config.database_url {
        Some(url) => {
            let store = SqliteInventoryStore::connect(url)
                .await
                .context("failed to open SQLite store")?;
            tracing::info!("using SQLite store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryInventoryStore::new())
        }
    };

    Ok(InventoryService::new(store))
}

/// In-memory services for tests/dev.
pub fn in_memory_services() -> AppServices {
    InventoryService::new(Arc::new(InMemoryInventoryStore::new()))
}
