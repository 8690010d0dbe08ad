//! SQLite-backed store implementation.
//!
//! ## Schema
//!
//! - `products` / `locations`: caller-supplied text primary keys.
//! - `product_movements`: `INTEGER PRIMARY KEY AUTOINCREMENT`, so a deleted
//!   movement id is never handed out again. `product_id` references
//!   `products` with `ON DELETE CASCADE`; the location columns carry no
//!   foreign key, so deleting a location leaves its movements in place and
//!   unknown location ids are accepted.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text (microsecond
//! precision), which makes lexical `ORDER BY` chronological.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (unique / primary key violation) | `DuplicateKey` |
//! | Database (check constraint violation) | `Validation` |
//! | Anything else | `Backend` |

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::instrument;

use stockroom_core::{Entity, LocationId, MovementId, ProductId};
use stockroom_inventory::{Location, Movement, NewLocation, NewMovement, NewProduct, Product};

use super::{InventoryStore, PRODUCT_NOT_FOUND_FOR_MOVEMENT, StoreError};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id  TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        description TEXT NULL,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        location_id TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        address     TEXT NULL,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_movements (
        movement_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp     TEXT NOT NULL,
        from_location TEXT NULL,
        to_location   TEXT NULL,
        product_id    TEXT NOT NULL REFERENCES products (product_id) ON DELETE CASCADE,
        qty           INTEGER NOT NULL CONSTRAINT check_positive_qty CHECK (qty > 0)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_product_movements_timestamp
        ON product_movements (timestamp)
    "#,
];

/// SQLite-backed inventory store.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone; uniqueness checks and
/// cascades run inside a transaction on a single pooled connection.
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    /// Open (creating if missing) the database at `url` and ensure the schema exists.
    ///
    /// In-memory URLs are pinned to a single long-lived connection, since every
    /// SQLite connection to `:memory:` sees its own empty database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(backend)?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(backend)?;
        }
        tracing::debug!("sqlite schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl InventoryStore for SqliteInventoryStore {
    #[instrument(skip(self, product), fields(product_id = %product.product_id()))]
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let exists = sqlx::query("SELECT 1 FROM products WHERE product_id = ?1")
            .bind(product.product_id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if exists.is_some() {
            return Err(StoreError::duplicate(Product::KIND, product.product_id()));
        }

        let product = product.into_product(now());
        sqlx::query(
            r#"
            INSERT INTO products (product_id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product.product_id.as_str())
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(encode_ts(&product.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, Product::KIND, &product.product_id))?;

        tx.commit().await.map_err(backend)?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: &ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT product_id, name, description, created_at
            FROM products
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(StoreError::not_found(Product::KIND, product_id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, name, description, created_at
            FROM products
            ORDER BY product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn search_products(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        // SQLite's lower() only folds ASCII, so matching happens here with the
        // same Unicode-aware rule the records use.
        let products = self.list_products().await?;
        Ok(products.into_iter().filter(|p| p.matches(needle)).collect())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let cascaded = sqlx::query("DELETE FROM product_movements WHERE product_id = ?1")
            .bind(product_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(backend)?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM products WHERE product_id = ?1")
            .bind(product_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(backend)?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back.
            return Err(StoreError::not_found(Product::KIND, product_id));
        }

        tx.commit().await.map_err(backend)?;
        tracing::debug!(cascaded, "product deleted");
        Ok(())
    }

    #[instrument(skip(self, location), fields(location_id = %location.location_id()))]
    async fn insert_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let exists = sqlx::query("SELECT 1 FROM locations WHERE location_id = ?1")
            .bind(location.location_id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if exists.is_some() {
            return Err(StoreError::duplicate(Location::KIND, location.location_id()));
        }

        let location = location.into_location(now());
        sqlx::query(
            r#"
            INSERT INTO locations (location_id, name, address, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(location.location_id.as_str())
        .bind(&location.name)
        .bind(location.address.as_deref())
        .bind(encode_ts(&location.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, Location::KIND, &location.location_id))?;

        tx.commit().await.map_err(backend)?;
        Ok(location)
    }

    #[instrument(skip(self))]
    async fn get_location(&self, location_id: &LocationId) -> Result<Location, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT location_id, name, address, created_at
            FROM locations
            WHERE location_id = ?1
            "#,
        )
        .bind(location_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => location_from_row(&row),
            None => Err(StoreError::not_found(Location::KIND, location_id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT location_id, name, address, created_at
            FROM locations
            ORDER BY location_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(location_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn delete_location(&self, location_id: &LocationId) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM locations WHERE location_id = ?1")
            .bind(location_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::not_found(Location::KIND, location_id));
        }
        Ok(())
    }

    #[instrument(skip(self, movement), fields(product_id = %movement.product_id(), qty = movement.qty()))]
    async fn insert_movement(&self, movement: NewMovement) -> Result<Movement, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let product = sqlx::query("SELECT 1 FROM products WHERE product_id = ?1")
            .bind(movement.product_id().as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if product.is_none() {
            return Err(StoreError::Validation(
                PRODUCT_NOT_FOUND_FOR_MOVEMENT.to_string(),
            ));
        }

        // Placeholder id; the real one comes from AUTOINCREMENT below.
        let draft = movement.into_movement(MovementId::new(0), now());
        let result = sqlx::query(
            r#"
            INSERT INTO product_movements (timestamp, from_location, to_location, product_id, qty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(encode_ts(&draft.timestamp))
        .bind(draft.from_location.as_ref().map(LocationId::as_str))
        .bind(draft.to_location.as_ref().map(LocationId::as_str))
        .bind(draft.product_id.as_str())
        .bind(draft.qty)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, Movement::KIND, &draft.product_id))?;

        tx.commit().await.map_err(backend)?;

        Ok(Movement {
            movement_id: MovementId::new(result.last_insert_rowid()),
            ..draft
        })
    }

    #[instrument(skip(self))]
    async fn get_movement(&self, movement_id: MovementId) -> Result<Movement, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT movement_id, timestamp, from_location, to_location, product_id, qty
            FROM product_movements
            WHERE movement_id = ?1
            "#,
        )
        .bind(movement_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => movement_from_row(&row),
            None => Err(StoreError::not_found(Movement::KIND, movement_id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT movement_id, timestamp, from_location, to_location, product_id, qty
            FROM product_movements
            ORDER BY timestamp DESC, movement_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(movement_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn delete_movement(&self, movement_id: MovementId) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM product_movements WHERE movement_id = ?1")
            .bind(movement_id.get())
            .execute(&self.pool)
            .await
            .map_err(backend)?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::not_found(Movement::KIND, movement_id));
        }
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Backend(format!("invalid timestamp '{raw}': {e}")))
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn map_write_error(err: sqlx::Error, kind: &'static str, id: &impl ToString) -> StoreError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::duplicate(kind, id.to_string());
        }
        if db.is_check_violation() {
            return StoreError::Validation(db.message().to_string());
        }
    }
    backend(err)
}

fn product_from_row(row: &SqliteRow) -> Result<Product, StoreError> {
    let created_at: String = row.try_get("created_at").map_err(backend)?;
    Ok(Product {
        product_id: ProductId::new(row.try_get::<String, _>("product_id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        created_at: decode_ts(&created_at)?,
    })
}

fn location_from_row(row: &SqliteRow) -> Result<Location, StoreError> {
    let created_at: String = row.try_get("created_at").map_err(backend)?;
    Ok(Location {
        location_id: LocationId::new(row.try_get::<String, _>("location_id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        address: row.try_get("address").map_err(backend)?,
        created_at: decode_ts(&created_at)?,
    })
}

fn movement_from_row(row: &SqliteRow) -> Result<Movement, StoreError> {
    let timestamp: String = row.try_get("timestamp").map_err(backend)?;
    let from_location: Option<String> = row.try_get("from_location").map_err(backend)?;
    let to_location: Option<String> = row.try_get("to_location").map_err(backend)?;
    Ok(Movement {
        movement_id: MovementId::new(row.try_get("movement_id").map_err(backend)?),
        timestamp: decode_ts(&timestamp)?,
        from_location: from_location.map(LocationId::new),
        to_location: to_location.map(LocationId::new),
        product_id: ProductId::new(row.try_get::<String, _>("product_id").map_err(backend)?),
        qty: row.try_get("qty").map_err(backend)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract_tests;

    async fn memory_store() -> SqliteInventoryStore {
        SqliteInventoryStore::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite")
    }

    #[tokio::test]
    async fn satisfies_store_contract() {
        contract_tests::run_all(memory_store).await;
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let store = memory_store().await;
        let again = SqliteInventoryStore::from_pool(store.pool().clone()).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn check_constraint_rejects_non_positive_qty() {
        let store = memory_store().await;
        store
            .insert_product(contract_tests::new_product("P1", "Laptop", None))
            .await
            .unwrap();

        let err = sqlx::query(
            "INSERT INTO product_movements (timestamp, product_id, qty) VALUES (?1, 'P1', 0)",
        )
        .bind(encode_ts(&Utc::now()))
        .execute(store.pool())
        .await
        .unwrap_err();

        assert!(matches!(
            map_write_error(err, Movement::KIND, &"P1"),
            StoreError::Validation(_)
        ));
    }

    #[test]
    fn timestamps_round_trip_at_micro_precision() {
        let ts = now();
        let encoded = encode_ts(&ts);
        assert!(encoded.ends_with('Z'));
        assert_eq!(decode_ts(&encoded).unwrap(), ts);
    }
}
