use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, LocationId, MovementId, ProductId};

pub(crate) const MOVEMENT_FIELDS_REQUIRED: &str = "Product ID and quantity required";
pub(crate) const QUANTITY_NOT_POSITIVE: &str = "Quantity must be positive";

/// Semantic kind of a movement, derived from which locations are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "Stock In")]
    StockIn,
    #[serde(rename = "Stock Out")]
    StockOut,
    #[serde(rename = "Transfer")]
    Transfer,
}

impl MovementType {
    /// Classify a movement from its source and destination.
    ///
    /// | from | to  | type      |
    /// |------|-----|-----------|
    /// | -    | set | Stock In  |
    /// | set  | -   | Stock Out |
    /// | set  | set | Transfer  |
    /// | -    | -   | Transfer  |
    pub fn classify(from: Option<&LocationId>, to: Option<&LocationId>) -> Self {
        match (from, to) {
            (None, Some(_)) => Self::StockIn,
            (Some(_), None) => Self::StockOut,
            _ => Self::Transfer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockIn => "Stock In",
            Self::StockOut => "Stock Out",
            Self::Transfer => "Transfer",
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded stock movement. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: i64,
}

impl Movement {
    pub fn movement_type(&self) -> MovementType {
        MovementType::classify(self.from_location.as_ref(), self.to_location.as_ref())
    }
}

impl Entity for Movement {
    type Id = MovementId;
    const KIND: &'static str = "Movement";

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}

/// Command: record a movement.
///
/// Location ids are taken as given; they are not checked against existing locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    product_id: ProductId,
    from_location: Option<LocationId>,
    to_location: Option<LocationId>,
    qty: i64,
    timestamp: Option<DateTime<Utc>>,
}

impl NewMovement {
    pub fn new(
        product_id: Option<String>,
        qty: Option<i64>,
        from_location: Option<String>,
        to_location: Option<String>,
    ) -> DomainResult<Self> {
        let product_id = product_id.filter(|s| !s.is_empty());
        let qty = qty.filter(|q| *q != 0);

        let (Some(product_id), Some(qty)) = (product_id, qty) else {
            return Err(DomainError::validation(MOVEMENT_FIELDS_REQUIRED));
        };
        if qty < 0 {
            return Err(DomainError::validation(QUANTITY_NOT_POSITIVE));
        }

        Ok(Self {
            product_id: ProductId::new(product_id),
            from_location: from_location.filter(|s| !s.is_empty()).map(LocationId::new),
            to_location: to_location.filter(|s| !s.is_empty()).map(LocationId::new),
            qty,
            timestamp: None,
        })
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }

    pub fn movement_type(&self) -> MovementType {
        MovementType::classify(self.from_location.as_ref(), self.to_location.as_ref())
    }

    /// Materialize the record with a store-assigned id; the timestamp defaults to `now`.
    pub fn into_movement(self, movement_id: MovementId, now: DateTime<Utc>) -> Movement {
        Movement {
            movement_id,
            timestamp: self.timestamp.unwrap_or(now),
            from_location: self.from_location,
            to_location: self.to_location,
            product_id: self.product_id,
            qty: self.qty,
        }
    }
}
