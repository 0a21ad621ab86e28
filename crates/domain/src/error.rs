//! Domain error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ids::{CourseId, EventId, SeatZoneId, VariantId};
use crate::order::{Money, OrderType};
use crate::own_package::OwnPackageStatus;

/// Errors raised while validating or constructing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order has no line items.
    #[error("order has no items")]
    NoItems,

    /// A line item has a zero quantity.
    #[error("line item {index} has zero quantity")]
    InvalidQuantity { index: usize },

    /// A line item has a negative unit price.
    #[error("line item {index} has a negative price")]
    InvalidPrice { index: usize },

    /// A line item references inventory of a different kind than the order type.
    #[error("line item {index} is a {item_kind} item but the order type is {order_type}")]
    ItemKindMismatch {
        index: usize,
        item_kind: OrderType,
        order_type: OrderType,
    },

    /// The declared total does not equal the sum of item prices.
    #[error("declared total {declared} does not match the item sum {computed}")]
    TotalMismatch { declared: Money, computed: Money },
}

/// Errors raised by inventory-unit adjustments.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A stock decrement would drive the variant counter negative.
    #[error("variant {variant_id}: requested {requested}, only {available} in stock")]
    InsufficientStock {
        variant_id: VariantId,
        requested: i64,
        available: i64,
    },

    /// A slot decrement would drive the course counter negative.
    #[error("course {course_id}: requested {requested}, only {available} slots available")]
    InsufficientCapacity {
        course_id: CourseId,
        requested: i64,
        available: i64,
    },

    /// A seat decrement would drive the zone counter negative.
    #[error("event {event_id} zone {zone_id}: requested {requested}, only {available} seats left")]
    InsufficientSeats {
        event_id: EventId,
        zone_id: SeatZoneId,
        requested: i64,
        available: i64,
    },

    /// The named seat zone is not embedded in the event listing.
    #[error("event {event_id} has no seat zone {zone_id}")]
    SeatZoneNotFound {
        event_id: EventId,
        zone_id: SeatZoneId,
    },
}

/// Errors raised by owned-package lifecycle operations.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Only active packages can be redeemed.
    #[error("package is {status}, only active packages can be redeemed")]
    NotActive { status: OwnPackageStatus },

    /// The package is past its expiry date.
    #[error("package expired at {expiry_date}")]
    Expired { expiry_date: DateTime<Utc> },
}

/// Umbrella error for domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("package error: {0}")]
    Package(#[from] PackageError),
}
