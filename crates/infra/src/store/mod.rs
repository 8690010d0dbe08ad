//! Entity storage abstractions.
//!
//! `InventoryStore` is the single persistence seam of the system. It owns
//! primary-key uniqueness, the Product → Movement cascade and movement id
//! assignment; callers only hand it validated commands.

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{LocationId, MovementId, ProductId};
use stockroom_inventory::{Location, Movement, NewLocation, NewMovement, NewProduct, Product};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryInventoryStore;
pub use sqlite::SqliteInventoryStore;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Primary identifier already taken.
    #[error("{kind} already exists")]
    DuplicateKey { kind: &'static str, id: String },

    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },

    /// The write would break a relational invariant (e.g. unknown product).
    #[error("{0}")]
    Validation(String),

    /// Backend failure (connection, decoding, poisoned lock...).
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn duplicate(kind: &'static str, id: impl ToString) -> Self {
        Self::DuplicateKey {
            kind,
            id: id.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Persistent storage for products, locations and movements.
///
/// Listing order is part of the contract: products and locations by id
/// ascending, movements by timestamp descending (ties by id descending).
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fails with `DuplicateKey` if the id exists; `created_at` defaults to now.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    /// Case-insensitive substring search over id, name and description.
    async fn search_products(&self, needle: &str) -> Result<Vec<Product>, StoreError>;
    /// Deletes the product and every movement referencing it.
    async fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError>;

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError>;
    async fn get_location(&self, location_id: &LocationId) -> Result<Location, StoreError>;
    async fn list_locations(&self) -> Result<Vec<Location>, StoreError>;
    /// Deletes the location row only; movements referencing it are kept.
    async fn delete_location(&self, location_id: &LocationId) -> Result<(), StoreError>;

    /// Fails with `Validation` if the product does not exist. Assigns the next
    /// movement id and defaults the timestamp to now.
    async fn insert_movement(&self, movement: NewMovement) -> Result<Movement, StoreError>;
    async fn get_movement(&self, movement_id: MovementId) -> Result<Movement, StoreError>;
    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError>;
    async fn delete_movement(&self, movement_id: MovementId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        (**self).insert_product(product).await
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Product, StoreError> {
        (**self).get_product(product_id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn search_products(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        (**self).search_products(needle).await
    }

    async fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError> {
        (**self).delete_product(product_id).await
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        (**self).insert_location(location).await
    }

    async fn get_location(&self, location_id: &LocationId) -> Result<Location, StoreError> {
        (**self).get_location(location_id).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        (**self).list_locations().await
    }

    async fn delete_location(&self, location_id: &LocationId) -> Result<(), StoreError> {
        (**self).delete_location(location_id).await
    }

    async fn insert_movement(&self, movement: NewMovement) -> Result<Movement, StoreError> {
        (**self).insert_movement(movement).await
    }

    async fn get_movement(&self, movement_id: MovementId) -> Result<Movement, StoreError> {
        (**self).get_movement(movement_id).await
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        (**self).list_movements().await
    }

    async fn delete_movement(&self, movement_id: MovementId) -> Result<(), StoreError> {
        (**self).delete_movement(movement_id).await
    }
}

pub(crate) const PRODUCT_NOT_FOUND_FOR_MOVEMENT: &str = "Product not found";

/// Sort movements newest first, breaking timestamp ties by id.
pub(crate) fn sort_movements_desc(movements: &mut [Movement]) {
    movements.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.movement_id.cmp(&a.movement_id))
    });
}
