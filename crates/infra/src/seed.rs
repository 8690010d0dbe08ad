//! Sample data for a fresh installation.
//!
//! Each table is seeded only when it is empty, so restarting against an
//! existing database never duplicates rows.

use stockroom_inventory::{NewLocation, NewMovement, NewProduct};

use crate::service::{InventoryService, ServiceResult};
use crate::store::InventoryStore;

/// Number of rows inserted per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub locations: usize,
    pub movements: usize,
}

const PRODUCTS: [(&str, &str, &str); 2] = [
    ("PROD001", "Laptop", "High-performance laptop"),
    ("PROD002", "Mouse", "Wireless mouse"),
];

const LOCATIONS: [(&str, &str, &str); 2] = [
    ("WH001", "Main Warehouse", "123 Storage Street"),
    ("STORE01", "Retail Store", "456 Market Road"),
];

/// (product, destination, qty); all stock-in.
const MOVEMENTS: [(&str, &str, i64); 2] = [("PROD001", "WH001", 20), ("PROD002", "STORE01", 15)];

pub async fn seed_sample_data<S>(service: &InventoryService<S>) -> ServiceResult<SeedSummary>
where
    S: InventoryStore,
{
    let mut summary = SeedSummary::default();

    if service.list_products(None).await?.is_empty() {
        for (id, name, description) in PRODUCTS {
            let cmd = NewProduct::new(Some(id.into()), Some(name.into()), Some(description.into()))?;
            service.create_product(cmd).await?;
            summary.products += 1;
        }
    }

    if service.list_locations().await?.is_empty() {
        for (id, name, address) in LOCATIONS {
            let cmd = NewLocation::new(Some(id.into()), Some(name.into()), Some(address.into()))?;
            service.create_location(cmd).await?;
            summary.locations += 1;
        }
    }

    if service.list_movements().await?.is_empty() {
        for (product_id, to_location, qty) in MOVEMENTS {
            let cmd = NewMovement::new(Some(product_id.into()), Some(qty), None, Some(to_location.into()))?;
            // The products table may have been non-empty without these ids.
            match service.create_movement(cmd).await {
                Ok(_) => summary.movements += 1,
                Err(e) => tracing::warn!(error = %e, product_id, "skipping sample movement"),
            }
        }
    }

    tracing::info!(
        products = summary.products,
        locations = summary.locations,
        movements = summary.movements,
        "sample data seeded"
    );
    Ok(summary)
}
