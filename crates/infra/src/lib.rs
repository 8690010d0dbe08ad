//! Infrastructure layer: storage, orchestration, configuration.

pub mod config;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use service::{InventoryService, ServiceError, ServiceResult};
pub use store::{InMemoryInventoryStore, InventoryStore, SqliteInventoryStore, StoreError};
