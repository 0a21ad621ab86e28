//! Order processing and inventory reconciliation.
//!
//! This crate owns the only subsystem of the platform with cross-entity
//! invariants:
//! - [`OrderCoordinator`] creates orders (validate, consume inventory for
//!   every line item, persist, all inside one store session) and applies
//!   status changes, returning consumed inventory exactly once when an
//!   order enters the cancelled/failed class.
//! - [`adjust`] holds the per-inventory-kind adjusters the coordinator
//!   dispatches to.
//! - [`PackageIssuer`] mints owned packages from paid ads-package orders,
//!   redeems them one-shot, and sweeps expired ones.

pub mod adjust;
pub mod coordinator;
pub mod error;
pub mod issuance;

pub use coordinator::{OrderCoordinator, OrderDraft};
pub use error::{CheckoutError, Result};
pub use issuance::PackageIssuer;
