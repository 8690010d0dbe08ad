//! Inventory domain module.
//!
//! This crate contains the records tracked by the system (products, storage
//! locations, stock movements) and the rules attached to them, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod location;
pub mod movement;
pub mod product;
pub mod report;

pub use location::{Location, NewLocation};
pub use movement::{Movement, MovementType, NewMovement};
pub use product::{NewProduct, Product};
pub use report::{LOW_STOCK_THRESHOLD, Quantity, StockLevel, StockReport, StockStatus};
