//! Checkout error types.

use common::OrderId;
use domain::{
    CatalogError, CourseId, DomainError, EventId, OrderError, OrderStatus, OrderType,
    OwnPackageId, PackageError, VariantId,
};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during order processing and package issuance.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// A line item references a variant that does not exist.
    #[error("variant not found: {0}")]
    VariantNotFound(VariantId),

    /// A line item references a course that does not exist.
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    /// A line item references an event that does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The owned package does not exist.
    #[error("owned package not found: {0}")]
    OwnPackageNotFound(OwnPackageId),

    /// The operation applies only to orders of another type.
    #[error("order {order_id} is a {actual} order, expected {expected}")]
    InvalidOrderType {
        order_id: OrderId,
        expected: OrderType,
        actual: OrderType,
    },

    /// Packages are issued from paid orders only.
    #[error("order {order_id} is {status}, packages are issued for paid orders only")]
    OrderNotPaid {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<OrderError> for CheckoutError {
    fn from(e: OrderError) -> Self {
        CheckoutError::Domain(e.into())
    }
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        CheckoutError::Domain(e.into())
    }
}

impl From<PackageError> for CheckoutError {
    fn from(e: PackageError) -> Self {
        CheckoutError::Domain(e.into())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
