//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

use super::{LineItem, Money, OrderStatus, OrderType, ShippingAddress};

/// Order aggregate root.
///
/// A purchase intent against one kind of inventory: the owning user, the
/// order type, a non-empty list of line items, the snapshotted total, a
/// shipping address, and the current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    order_type: OrderType,
    items: Vec<LineItem>,
    total_price: Money,
    shipping_address: ShippingAddress,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Validates and constructs a new `Pending` order.
    ///
    /// Rejects empty item lists, zero quantities, negative prices, items
    /// whose inventory kind disagrees with `order_type`, and a declared
    /// total that does not equal the sum of `price_at_order * quantity`.
    pub fn place(
        user_id: UserId,
        order_type: OrderType,
        items: Vec<LineItem>,
        total_price: Money,
        shipping_address: ShippingAddress,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let mut computed = Money::zero();
        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity { index });
            }
            if item.price_at_order.is_negative() {
                return Err(OrderError::InvalidPrice { index });
            }
            let item_kind = item.inventory.order_type();
            if item_kind != order_type {
                return Err(OrderError::ItemKindMismatch {
                    index,
                    item_kind,
                    order_type,
                });
            }
            computed += item.total_price();
        }

        if computed != total_price {
            return Err(OrderError::TotalMismatch {
                declared: total_price,
                computed,
            });
        }

        Ok(Self {
            id: OrderId::new(),
            user_id,
            order_type,
            items,
            total_price,
            shipping_address,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the order type.
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Returns the line items in input order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the snapshotted total.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Returns the shipping address snapshot.
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the immutable creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the order status.
    ///
    /// Whether the change requires an inventory rollback is decided by the
    /// coordinator before calling this; the aggregate records the new value.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Returns the total quantity across all items.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
