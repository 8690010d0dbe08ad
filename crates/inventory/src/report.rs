//! Stock-level report derived from the movement history.
//!
//! Balances are never stored: each movement adds its quantity to the destination
//! and subtracts it from the source, per (product, location).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use stockroom_core::{LocationId, ProductId};

use crate::{Location, Movement, Product};

/// Balances below this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Balance type. Each movement qty fits in `i64`, but sums of them may not.
pub type Quantity = i128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
}

impl StockStatus {
    fn for_qty(qty: Quantity) -> Self {
        if qty < Quantity::from(LOW_STOCK_THRESHOLD) {
            Self::LowStock
        } else {
            Self::InStock
        }
    }
}

/// Current balance of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub qty: Quantity,
    pub status: StockStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockReport {
    pub rows: Vec<StockLevel>,
    pub total_items: Quantity,
    pub low_stock_count: usize,
    pub active_locations: usize,
}

impl StockReport {
    /// Compute positive balances for products and locations that still exist.
    ///
    /// Rows are sorted by product name, then location name.
    pub fn compute(products: &[Product], locations: &[Location], movements: &[Movement]) -> Self {
        let mut balances: BTreeMap<(&ProductId, &LocationId), Quantity> = BTreeMap::new();
        for m in movements {
            let qty = Quantity::from(m.qty);
            if let Some(to) = &m.to_location {
                *balances.entry((&m.product_id, to)).or_insert(0) += qty;
            }
            if let Some(from) = &m.from_location {
                *balances.entry((&m.product_id, from)).or_insert(0) -= qty;
            }
        }

        let products: HashMap<&ProductId, &Product> =
            products.iter().map(|p| (&p.product_id, p)).collect();
        let locations: HashMap<&LocationId, &Location> =
            locations.iter().map(|l| (&l.location_id, l)).collect();

        let mut rows: Vec<StockLevel> = balances
            .into_iter()
            .filter(|(_, qty)| *qty > 0)
            .filter_map(|((product_id, location_id), qty)| {
                let product = products.get(product_id)?;
                let location = locations.get(location_id)?;
                Some(StockLevel {
                    product_id: product_id.clone(),
                    product_name: product.name.clone(),
                    location_id: location_id.clone(),
                    location_name: location.name.clone(),
                    qty,
                    status: StockStatus::for_qty(qty),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            a.product_name
                .cmp(&b.product_name)
                .then_with(|| a.location_name.cmp(&b.location_name))
        });

        let total_items = rows.iter().map(|r| r.qty).sum();
        let low_stock_count = rows
            .iter()
            .filter(|r| r.status == StockStatus::LowStock)
            .count();
        let active_locations = rows
            .iter()
            .map(|r| &r.location_id)
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            rows,
            total_items,
            low_stock_count,
            active_locations,
        }
    }
}
