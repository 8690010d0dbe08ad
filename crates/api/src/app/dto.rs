use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

use stockroom_core::DomainResult;
use stockroom_inventory::{Location, Movement, NewLocation, NewMovement, NewProduct, Product};

// -------------------------
// Request DTOs
// -------------------------
//
// Every field is optional at the wire level so that missing fields surface as
// the domain's validation message rather than a deserializer error.

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateProductRequest {
    pub fn into_command(self) -> DomainResult<NewProduct> {
        NewProduct::new(self.product_id, self.name, self.description)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateLocationRequest {
    pub location_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl CreateLocationRequest {
    pub fn into_command(self) -> DomainResult<NewLocation> {
        NewLocation::new(self.location_id, self.name, self.address)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMovementRequest {
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_qty")]
    pub qty: Option<i64>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub timestamp: Option<DateTime<Utc>>, // RFC3339
}

impl CreateMovementRequest {
    pub fn into_command(self) -> DomainResult<NewMovement> {
        let cmd = NewMovement::new(self.product_id, self.qty, self.from_location, self.to_location)?;
        Ok(match self.timestamp {
            Some(ts) => cmd.with_timestamp(ts),
            None => cmd,
        })
    }
}

/// Accepts `5`, `"5"` or `null`; a blank string counts as missing.
fn lenient_qty<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) => match text.trim() {
            "" => Ok(None),
            digits => digits
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid qty '{text}'"))),
        },
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "product_id": p.product_id,
        "name": p.name,
        "description": p.description,
        "created_at": iso(&p.created_at),
    })
}

pub fn location_to_json(l: Location) -> serde_json::Value {
    serde_json::json!({
        "location_id": l.location_id,
        "name": l.name,
        "address": l.address,
        "created_at": iso(&l.created_at),
    })
}

pub fn movement_to_json(m: Movement) -> serde_json::Value {
    let movement_type = m.movement_type();
    serde_json::json!({
        "movement_id": m.movement_id,
        "timestamp": iso(&m.timestamp),
        "from_location": m.from_location,
        "to_location": m.to_location,
        "product_id": m.product_id,
        "qty": m.qty,
        "movement_type": movement_type,
    })
}
