//! Supplier directory entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// A stored supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,

    /// Tax identifier; empty when unknown.
    #[serde(default)]
    pub tax_id: String,

    #[serde(default)]
    pub address: String,

    pub created_at: DateTime<Utc>,
}

/// Supplier details before they are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSupplier {
    pub name: String,
    pub tax_id: String,
    pub address: String,
}

impl NewSupplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = tax_id.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Assign an id and creation time. A blank name is rejected.
    pub fn into_supplier(self) -> Result<Supplier, StorageError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StorageError::InvalidSupplier(
                "supplier name is required".to_string(),
            ));
        }

        Ok(Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tax_id: self.tax_id.trim().to_string(),
            address: self.address.trim().to_string(),
            created_at: Utc::now(),
        })
    }
}
