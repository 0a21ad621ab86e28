//! Catalog inventory units the order core reads and mutates.
//!
//! Each unit owns its adjustment rule: a delta is negative for consumption
//! and positive for release, and no counter is ever left negative.

mod course;
mod event;
mod package;
mod variant;

pub use course::Course;
pub use event::{EventListing, SeatZone};
pub use package::AdsPackage;
pub use variant::{Variant, VariantStatus};
