//! Domain layer for the marketplace order core.
//!
//! This crate provides the entities and rules the rest of the system
//! orchestrates:
//! - the `Order` aggregate with its line-item sum type and status machine
//! - catalog inventory units (variants, courses, event seat zones, ads
//!   packages) carrying their own adjustment invariants
//! - `OwnPackage`, a user's redeemable instance of a purchased ads package

pub mod catalog;
pub mod error;
pub mod ids;
pub mod order;
pub mod own_package;

pub use catalog::{AdsPackage, Course, EventListing, SeatZone, Variant, VariantStatus};
pub use error::{CatalogError, DomainError, OrderError, PackageError};
pub use ids::{CourseId, EventId, OwnPackageId, PackageId, SeatZoneId, VariantId};
pub use order::{
    InventoryRef, LineItem, Money, Order, OrderStatus, OrderType, ShippingAddress,
};
pub use own_package::{OwnPackage, OwnPackageStatus};
