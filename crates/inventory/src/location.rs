use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, LocationId};

pub(crate) const LOCATION_FIELDS_REQUIRED: &str = "Location ID and name are required";

/// A storage location (warehouse, store, shelf...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Location {
    type Id = LocationId;
    const KIND: &'static str = "Location";

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}

/// Command: insert a new location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    location_id: LocationId,
    name: String,
    address: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl NewLocation {
    pub fn new(
        location_id: Option<String>,
        name: Option<String>,
        address: Option<String>,
    ) -> DomainResult<Self> {
        let location_id = location_id.filter(|s| !s.is_empty());
        let name = name.filter(|s| !s.is_empty());

        match (location_id, name) {
            (Some(location_id), Some(name)) => Ok(Self {
                location_id: LocationId::new(location_id),
                name,
                address,
                created_at: None,
            }),
            _ => Err(DomainError::validation(LOCATION_FIELDS_REQUIRED)),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn into_location(self, now: DateTime<Utc>) -> Location {
        Location {
            location_id: self.location_id,
            name: self.name,
            address: self.address,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}
