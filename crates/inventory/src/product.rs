use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId};

pub(crate) const PRODUCT_FIELDS_REQUIRED: &str = "Product ID and name are required";

/// A product that can be moved between locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Case-insensitive substring match over id, name and description.
    ///
    /// An empty needle matches every product.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(self.product_id.as_str())
            || contains(&self.name)
            || self.description.as_deref().is_some_and(contains)
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "Product";

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

/// Command: insert a new product.
///
/// Construction validates the request shape; uniqueness of the id is checked by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    product_id: ProductId,
    name: String,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    pub fn new(
        product_id: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let product_id = product_id.filter(|s| !s.is_empty());
        let name = name.filter(|s| !s.is_empty());

        match (product_id, name) {
            (Some(product_id), Some(name)) => Ok(Self {
                product_id: ProductId::new(product_id),
                name,
                description,
                created_at: None,
            }),
            _ => Err(DomainError::validation(PRODUCT_FIELDS_REQUIRED)),
        }
    }

    /// Pin the creation time instead of letting the store stamp it.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Materialize the record, defaulting `created_at` to `now`.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            product_id: self.product_id,
            name: self.name,
            description: self.description,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}
