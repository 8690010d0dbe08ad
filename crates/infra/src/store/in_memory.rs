use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use stockroom_core::{Entity, LocationId, MovementId, ProductId};
use stockroom_inventory::{Location, Movement, NewLocation, NewMovement, NewProduct, Product};

use super::{InventoryStore, PRODUCT_NOT_FOUND_FOR_MOVEMENT, StoreError, sort_movements_desc};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    locations: BTreeMap<LocationId, Location>,
    movements: BTreeMap<MovementId, Movement>,
    /// Last assigned movement id; only ever increases.
    last_movement_id: i64,
}

/// In-memory store for tests/dev.
///
/// A single lock guards all three tables so that the uniqueness check and the
/// insert, or the cascade and the product delete, happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

/// Store a freshly built record under its own id and hand back a copy.
fn put<E>(table: &mut BTreeMap<E::Id, E>, record: E) -> E
where
    E: Entity + Clone,
    E::Id: Ord,
{
    table.insert(record.id().clone(), record.clone());
    record
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tables = self.write()?;
        if tables.products.contains_key(product.product_id()) {
            return Err(StoreError::duplicate(Product::KIND, product.product_id()));
        }

        let product = product.into_product(Utc::now());
        Ok(put(&mut tables.products, product))
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Product, StoreError> {
        self.read()?
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Product::KIND, product_id))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn search_products(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| p.matches(needle))
            .cloned()
            .collect())
    }

    async fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.products.remove(product_id).is_none() {
            return Err(StoreError::not_found(Product::KIND, product_id));
        }
        tables.movements.retain(|_, m| &m.product_id != product_id);
        Ok(())
    }

    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        let mut tables = self.write()?;
        if tables.locations.contains_key(location.location_id()) {
            return Err(StoreError::duplicate(Location::KIND, location.location_id()));
        }

        let location = location.into_location(Utc::now());
        Ok(put(&mut tables.locations, location))
    }

    async fn get_location(&self, location_id: &LocationId) -> Result<Location, StoreError> {
        self.read()?
            .locations
            .get(location_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Location::KIND, location_id))
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.read()?.locations.values().cloned().collect())
    }

    async fn delete_location(&self, location_id: &LocationId) -> Result<(), StoreError> {
        self.write()?
            .locations
            .remove(location_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(Location::KIND, location_id))
    }

    async fn insert_movement(&self, movement: NewMovement) -> Result<Movement, StoreError> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(movement.product_id()) {
            return Err(StoreError::Validation(
                PRODUCT_NOT_FOUND_FOR_MOVEMENT.to_string(),
            ));
        }

        tables.last_movement_id += 1;
        let id = MovementId::new(tables.last_movement_id);
        let movement = movement.into_movement(id, Utc::now());
        Ok(put(&mut tables.movements, movement))
    }

    async fn get_movement(&self, movement_id: MovementId) -> Result<Movement, StoreError> {
        self.read()?
            .movements
            .get(&movement_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Movement::KIND, movement_id))
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let mut movements: Vec<Movement> = self.read()?.movements.values().cloned().collect();
        sort_movements_desc(&mut movements);
        Ok(movements)
    }

    async fn delete_movement(&self, movement_id: MovementId) -> Result<(), StoreError> {
        self.write()?
            .movements
            .remove(&movement_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(Movement::KIND, movement_id))
    }
}
