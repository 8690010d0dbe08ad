//! Query/command service (application-level orchestration).
//!
//! One operation per entity per verb. Each call is a single request/response
//! against the injected store:
//!
//! ```text
//! validated command (NewProduct / NewLocation / NewMovement)
//!   ↓
//! store uniqueness / existence checks + write
//!   ↓
//! read-side record (movements classified on read)
//! ```
//!
//! Shape validation happens when the command is constructed; this module maps
//! store failures onto the service taxonomy (validation / conflict / not found).

use thiserror::Error;

use stockroom_core::{DomainError, LocationId, MovementId, ProductId};
use stockroom_inventory::{
    Location, Movement, NewLocation, NewMovement, NewProduct, Product, StockReport,
};

use crate::store::{InventoryStore, StoreError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            e @ StoreError::DuplicateKey { .. } => ServiceError::Conflict(e.to_string()),
            e @ StoreError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
            StoreError::Validation(msg) => ServiceError::Validation(msg),
            StoreError::Backend(msg) => ServiceError::Storage(msg),
        }
    }
}

/// Inventory operations over an owned store handle.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // -------------------------
    // Products
    // -------------------------

    /// All products, or those matching `search` when it is non-empty.
    pub async fn list_products(&self, search: Option<&str>) -> ServiceResult<Vec<Product>> {
        let products = match search.filter(|s| !s.is_empty()) {
            Some(needle) => self.store.search_products(needle).await?,
            None => self.store.list_products().await?,
        };
        Ok(products)
    }

    pub async fn create_product(&self, cmd: NewProduct) -> ServiceResult<Product> {
        let product = self.store.insert_product(cmd).await.inspect_err(|e| {
            tracing::debug!(error = %e, "product rejected");
        })?;
        tracing::info!(product_id = %product.product_id, "product created");
        Ok(product)
    }

    pub async fn delete_product(&self, product_id: &ProductId) -> ServiceResult<()> {
        self.store.delete_product(product_id).await?;
        tracing::info!(%product_id, "product deleted with its movements");
        Ok(())
    }

    // -------------------------
    // Locations
    // -------------------------

    pub async fn list_locations(&self) -> ServiceResult<Vec<Location>> {
        Ok(self.store.list_locations().await?)
    }

    pub async fn create_location(&self, cmd: NewLocation) -> ServiceResult<Location> {
        let location = self.store.insert_location(cmd).await.inspect_err(|e| {
            tracing::debug!(error = %e, "location rejected");
        })?;
        tracing::info!(location_id = %location.location_id, "location created");
        Ok(location)
    }

    /// Movements referencing the location are left untouched.
    pub async fn delete_location(&self, location_id: &LocationId) -> ServiceResult<()> {
        self.store.delete_location(location_id).await?;
        tracing::info!(%location_id, "location deleted");
        Ok(())
    }

    // -------------------------
    // Movements
    // -------------------------

    /// Newest first.
    pub async fn list_movements(&self) -> ServiceResult<Vec<Movement>> {
        Ok(self.store.list_movements().await?)
    }

    pub async fn create_movement(&self, cmd: NewMovement) -> ServiceResult<Movement> {
        let movement = self.store.insert_movement(cmd).await.inspect_err(|e| {
            tracing::debug!(error = %e, "movement rejected");
        })?;
        tracing::info!(
            movement_id = %movement.movement_id,
            product_id = %movement.product_id,
            movement_type = %movement.movement_type(),
            qty = movement.qty,
            "movement recorded"
        );
        Ok(movement)
    }

    pub async fn delete_movement(&self, movement_id: MovementId) -> ServiceResult<()> {
        self.store.delete_movement(movement_id).await?;
        tracing::info!(%movement_id, "movement deleted");
        Ok(())
    }

    // -------------------------
    // Reports
    // -------------------------

    pub async fn stock_report(&self) -> ServiceResult<StockReport> {
        let products = self.store.list_products().await?;
        let locations = self.store.list_locations().await?;
        let movements = self.store.list_movements().await?;
        Ok(StockReport::compute(&products, &locations, &movements))
    }
}
