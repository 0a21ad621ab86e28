use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    AdsPackage, Course, CourseId, EventId, EventListing, Order, OrderStatus, OwnPackage,
    OwnPackageId, PackageId, Variant, VariantId,
};

use crate::error::Result;

/// A document store supporting multi-document atomic sessions.
#[async_trait]
pub trait DocumentStore: Send + Sync + Clone {
    /// The unit-of-work type produced by this store.
    type Session: StoreSession;

    /// Opens a new atomic session.
    ///
    /// Nothing written through the session is visible to other sessions
    /// until [`StoreSession::commit`]; dropping or aborting the session
    /// discards every write.
    async fn begin(&self) -> Result<Self::Session>;
}

/// One atomic unit of work over the marketplace documents.
///
/// All reads observe the session's own uncommitted writes. The session is
/// consumed by `commit`/`abort`, so a scope cannot be reused after it ends.
#[async_trait]
pub trait StoreSession: Send {
    // -- Orders --

    /// Persists a new order. Fails with `Duplicate` if the ID exists.
    async fn insert_order(&mut self, order: &Order) -> Result<()>;

    /// Loads an order by ID.
    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Writes a new status for an existing order.
    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()>;

    // -- Inventory units --

    /// Loads a product variant by ID.
    async fn find_variant(&mut self, id: VariantId) -> Result<Option<Variant>>;

    /// Upserts a product variant.
    async fn put_variant(&mut self, variant: &Variant) -> Result<()>;

    /// Upserts a batch of product variants in one call.
    async fn put_variants(&mut self, variants: &[Variant]) -> Result<()>;

    /// Loads a course by ID.
    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>>;

    /// Upserts a course.
    async fn put_course(&mut self, course: &Course) -> Result<()>;

    /// Loads an event listing (with its embedded seat zones) by ID.
    async fn find_event(&mut self, id: EventId) -> Result<Option<EventListing>>;

    /// Upserts an event listing whole, including its seat zones.
    async fn put_event(&mut self, event: &EventListing) -> Result<()>;

    /// Loads an ads-package catalog entry by ID.
    async fn find_ads_package(&mut self, id: PackageId) -> Result<Option<AdsPackage>>;

    /// Upserts an ads-package catalog entry.
    async fn put_ads_package(&mut self, package: &AdsPackage) -> Result<()>;

    // -- Owned packages --

    /// Persists a batch of newly issued packages.
    ///
    /// Fails with `Duplicate` if any `(order_id, item_index, sequence)`
    /// issuance key already exists.
    async fn insert_own_packages(&mut self, packages: &[OwnPackage]) -> Result<()>;

    /// Loads an owned package by ID.
    async fn find_own_package(&mut self, id: OwnPackageId) -> Result<Option<OwnPackage>>;

    /// Loads every package issued from the given order.
    async fn find_own_packages_for_order(&mut self, order_id: OrderId)
    -> Result<Vec<OwnPackage>>;

    /// Persists a mutated owned package.
    async fn update_own_package(&mut self, package: &OwnPackage) -> Result<()>;

    /// Bulk-moves every active package past its expiry to `Expired`.
    ///
    /// Returns the number of packages updated.
    async fn expire_due_packages(&mut self, now: DateTime<Utc>) -> Result<u64>;

    // -- Scope control --

    /// Makes every write of this session visible atomically.
    async fn commit(self) -> Result<()>;

    /// Discards every write of this session.
    async fn abort(self) -> Result<()>;
}
