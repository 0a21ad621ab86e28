//! Order status machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Orders are created `Pending`. Payment capture (external to this core)
/// moves them to `Paid`/`Completed`; `Cancelled` and `Failed` trigger an
/// inventory rollback when the order leaves the non-released class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, inventory consumed, awaiting payment.
    #[default]
    Pending,

    /// Payment captured.
    Paid,

    /// Order fulfilled.
    Completed,

    /// Order cancelled; consumed inventory has been returned.
    Cancelled,

    /// Payment or fulfillment failed; consumed inventory has been returned.
    Failed,
}

impl OrderStatus {
    /// Returns true if this status belongs to the class of statuses whose
    /// inventory has been released back to its source units.
    pub fn releases_inventory(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Failed)
    }

    /// Returns true if moving from `old` into `self` requires returning the
    /// order's consumed inventory.
    ///
    /// The rule is pure set membership on the released class, not a full
    /// transition table: entering the class rolls back, moving within it
    /// (or within the non-released class) does not.
    pub fn requires_rollback_from(self, old: OrderStatus) -> bool {
        self.releases_inventory() && !old.releases_inventory()
    }

    /// Returns the status name as used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
