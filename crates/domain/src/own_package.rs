//! Owned packages: a user's redeemable instance of a purchased ads package.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::AdsPackage;
use crate::error::PackageError;
use crate::ids::{OwnPackageId, PackageId};

/// Lifecycle status of an owned package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnPackageStatus {
    /// Issued and redeemable until expiry.
    Active,
    /// Redeemed exactly once against a course or event.
    Used,
    /// Expiry date passed while still active.
    Expired,
    /// Withdrawn out of band.
    Cancelled,
}

impl OwnPackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnPackageStatus::Active => "active",
            OwnPackageStatus::Used => "used",
            OwnPackageStatus::Expired => "expired",
            OwnPackageStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OwnPackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One redeemable package instance minted from a paid ads-package order.
///
/// `(order_id, item_index, sequence)` identifies the instance within its
/// order and serves as the issuance idempotency key in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnPackage {
    id: OwnPackageId,
    user_id: UserId,
    package_id: PackageId,
    order_id: OrderId,
    item_index: u32,
    sequence: u32,
    kind: String,
    status: OwnPackageStatus,
    expiry_date: DateTime<Utc>,
    purchased_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    ref_id: Option<Uuid>,
}

impl OwnPackage {
    /// Mints one active instance from a catalog entry.
    ///
    /// The expiry is the purchase time plus the catalog validity window.
    pub fn issue(
        user_id: UserId,
        catalog: &AdsPackage,
        order_id: OrderId,
        item_index: u32,
        sequence: u32,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OwnPackageId::new(),
            user_id,
            package_id: catalog.id(),
            order_id,
            item_index,
            sequence,
            kind: catalog.kind().to_string(),
            status: OwnPackageStatus::Active,
            expiry_date: purchased_at + chrono::Duration::days(catalog.duration_days()),
            purchased_at,
            used_at: None,
            ref_id: None,
        }
    }

    pub fn id(&self) -> OwnPackageId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn package_id(&self) -> PackageId {
        self.package_id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn item_index(&self) -> u32 {
        self.item_index
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn status(&self) -> OwnPackageStatus {
        self.status
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn purchased_at(&self) -> DateTime<Utc> {
        self.purchased_at
    }

    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// The course/event the package was redeemed against, once used.
    pub fn ref_id(&self) -> Option<Uuid> {
        self.ref_id
    }

    /// Returns true if the expiry date has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    /// Redeems the package against a course or event, exactly once.
    pub fn redeem(&mut self, ref_id: Uuid, now: DateTime<Utc>) -> Result<(), PackageError> {
        if self.status != OwnPackageStatus::Active {
            return Err(PackageError::NotActive {
                status: self.status,
            });
        }
        if self.is_expired_at(now) {
            return Err(PackageError::Expired {
                expiry_date: self.expiry_date,
            });
        }

        self.status = OwnPackageStatus::Used;
        self.used_at = Some(now);
        self.ref_id = Some(ref_id);
        Ok(())
    }

    /// Marks an active, past-expiry package as expired.
    pub fn mark_expired(&mut self) {
        if self.status == OwnPackageStatus::Active {
            self.status = OwnPackageStatus::Expired;
        }
    }
}
