use serde::{Deserialize, Serialize};

use crate::ids::PackageId;
use crate::order::Money;

/// An ads-package catalog entry.
///
/// Immutable: purchasing a package adjusts no counter on the entry itself;
/// issuance mints `OwnPackage` records from it instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsPackage {
    id: PackageId,
    kind: String,
    duration_days: i64,
    price: Money,
}

impl AdsPackage {
    pub fn new(id: PackageId, kind: impl Into<String>, duration_days: i64, price: Money) -> Self {
        Self {
            id,
            kind: kind.into(),
            duration_days,
            price,
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Validity window granted to each issued package, in days.
    pub fn duration_days(&self) -> i64 {
        self.duration_days
    }

    pub fn price(&self) -> Money {
        self.price
    }
}
