use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::VariantId;

/// Availability status of a product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    Active,
    Inactive,
    OutOfStock,
}

/// A product SKU with countable stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    id: VariantId,
    stock: i64,
    status: VariantStatus,
}

impl Variant {
    /// Creates a variant with the given starting stock.
    pub fn new(id: VariantId, stock: i64) -> Self {
        let status = if stock == 0 {
            VariantStatus::OutOfStock
        } else {
            VariantStatus::Active
        };
        Self { id, stock, status }
    }

    pub fn id(&self) -> VariantId {
        self.id
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn status(&self) -> VariantStatus {
        self.status
    }

    /// Applies a signed stock adjustment and recomputes the derived status.
    ///
    /// `status` becomes `OutOfStock` iff the committed stock is zero; a
    /// variant leaving zero stock returns to `Active`.
    pub fn adjust_stock(&mut self, delta: i64) -> Result<(), CatalogError> {
        let updated = self.stock + delta;
        if updated < 0 {
            return Err(CatalogError::InsufficientStock {
                variant_id: self.id,
                requested: -delta,
                available: self.stock,
            });
        }

        self.stock = updated;
        if self.stock == 0 {
            self.status = VariantStatus::OutOfStock;
        } else if self.status == VariantStatus::OutOfStock {
            self.status = VariantStatus::Active;
        }
        Ok(())
    }
}
