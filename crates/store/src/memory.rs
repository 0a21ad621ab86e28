use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    AdsPackage, Course, CourseId, EventId, EventListing, Order, OrderStatus, OwnPackage,
    OwnPackageId, OwnPackageStatus, PackageId, SeatZoneId, Variant, VariantId,
};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::{DocumentStore, StoreSession};

#[derive(Debug, Clone, Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    variants: HashMap<VariantId, Variant>,
    courses: HashMap<CourseId, Course>,
    events: HashMap<EventId, EventListing>,
    ads_packages: HashMap<PackageId, AdsPackage>,
    own_packages: HashMap<OwnPackageId, OwnPackage>,
}

/// In-memory document store for tests and local runs.
///
/// A session works on a full copy of the shared state and swaps it back in
/// on commit, so a scope is all-or-nothing exactly like the PostgreSQL
/// implementation. Concurrent sessions are last-writer-wins; tests drive
/// sessions sequentially.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a variant directly into committed state.
    pub async fn seed_variant(&self, variant: Variant) {
        self.state
            .write()
            .await
            .variants
            .insert(variant.id(), variant);
    }

    /// Seeds a course directly into committed state.
    pub async fn seed_course(&self, course: Course) {
        self.state.write().await.courses.insert(course.id(), course);
    }

    /// Seeds an event listing directly into committed state.
    pub async fn seed_event(&self, event: EventListing) {
        self.state.write().await.events.insert(event.id(), event);
    }

    /// Seeds an ads-package catalog entry directly into committed state.
    pub async fn seed_ads_package(&self, package: AdsPackage) {
        self.state
            .write()
            .await
            .ads_packages
            .insert(package.id(), package);
    }

    /// Seeds an owned package directly into committed state.
    pub async fn seed_own_package(&self, package: OwnPackage) {
        self.state
            .write()
            .await
            .own_packages
            .insert(package.id(), package);
    }

    /// Returns the committed stock of a variant.
    pub async fn variant_stock(&self, id: VariantId) -> Option<i64> {
        self.state.read().await.variants.get(&id).map(|v| v.stock())
    }

    /// Returns the committed slot count of a course.
    pub async fn course_slots(&self, id: CourseId) -> Option<i64> {
        self.state
            .read()
            .await
            .courses
            .get(&id)
            .map(|c| c.available_slot())
    }

    /// Returns the committed seat count of an event zone.
    pub async fn zone_seats(&self, event_id: EventId, zone_id: SeatZoneId) -> Option<i64> {
        self.state
            .read()
            .await
            .events
            .get(&event_id)
            .and_then(|e| e.zone(zone_id).map(|z| z.number_of_seat))
    }

    /// Returns a committed order by ID.
    pub async fn get_order(&self, id: OrderId) -> Option<Order> {
        self.state.read().await.orders.get(&id).cloned()
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns a committed owned package by ID.
    pub async fn get_own_package(&self, id: OwnPackageId) -> Option<OwnPackage> {
        self.state.read().await.own_packages.get(&id).cloned()
    }

    /// Returns the number of committed owned packages.
    pub async fn own_package_count(&self) -> usize {
        self.state.read().await.own_packages.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    type Session = InMemorySession;

    async fn begin(&self) -> Result<InMemorySession> {
        let working = self.state.read().await.clone();
        Ok(InMemorySession {
            shared: self.state.clone(),
            working,
        })
    }
}

/// Unit of work over a private copy of the store state.
pub struct InMemorySession {
    shared: Arc<RwLock<State>>,
    working: State,
}

#[async_trait]
impl StoreSession for InMemorySession {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        if self.working.orders.contains_key(&order.id()) {
            return Err(StoreError::Duplicate(format!("order {}", order.id())));
        }
        self.working.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        if let Some(order) = self.working.orders.get_mut(&id) {
            order.set_status(status);
        }
        Ok(())
    }

    async fn find_variant(&mut self, id: VariantId) -> Result<Option<Variant>> {
        Ok(self.working.variants.get(&id).cloned())
    }

    async fn put_variant(&mut self, variant: &Variant) -> Result<()> {
        self.working
            .variants
            .insert(variant.id(), variant.clone());
        Ok(())
    }

    async fn put_variants(&mut self, variants: &[Variant]) -> Result<()> {
        for variant in variants {
            self.working
                .variants
                .insert(variant.id(), variant.clone());
        }
        Ok(())
    }

    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.working.courses.get(&id).cloned())
    }

    async fn put_course(&mut self, course: &Course) -> Result<()> {
        self.working.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn find_event(&mut self, id: EventId) -> Result<Option<EventListing>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn put_event(&mut self, event: &EventListing) -> Result<()> {
        self.working.events.insert(event.id(), event.clone());
        Ok(())
    }

    async fn find_ads_package(&mut self, id: PackageId) -> Result<Option<AdsPackage>> {
        Ok(self.working.ads_packages.get(&id).cloned())
    }

    async fn put_ads_package(&mut self, package: &AdsPackage) -> Result<()> {
        self.working
            .ads_packages
            .insert(package.id(), package.clone());
        Ok(())
    }

    async fn insert_own_packages(&mut self, packages: &[OwnPackage]) -> Result<()> {
        for package in packages {
            let key = (package.order_id(), package.item_index(), package.sequence());
            let collision = self.working.own_packages.values().any(|existing| {
                (existing.order_id(), existing.item_index(), existing.sequence()) == key
            });
            if collision || self.working.own_packages.contains_key(&package.id()) {
                return Err(StoreError::Duplicate(format!(
                    "own package for order {} item {} seq {}",
                    package.order_id(),
                    package.item_index(),
                    package.sequence()
                )));
            }
            self.working
                .own_packages
                .insert(package.id(), package.clone());
        }
        Ok(())
    }

    async fn find_own_package(&mut self, id: OwnPackageId) -> Result<Option<OwnPackage>> {
        Ok(self.working.own_packages.get(&id).cloned())
    }

    async fn find_own_packages_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<OwnPackage>> {
        let mut packages: Vec<OwnPackage> = self
            .working
            .own_packages
            .values()
            .filter(|p| p.order_id() == order_id)
            .cloned()
            .collect();
        packages.sort_by_key(|p| (p.item_index(), p.sequence()));
        Ok(packages)
    }

    async fn update_own_package(&mut self, package: &OwnPackage) -> Result<()> {
        self.working
            .own_packages
            .insert(package.id(), package.clone());
        Ok(())
    }

    async fn expire_due_packages(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let mut updated = 0;
        for package in self.working.own_packages.values_mut() {
            if package.status() == OwnPackageStatus::Active && package.is_expired_at(now) {
                package.mark_expired();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn commit(self) -> Result<()> {
        *self.shared.write().await = self.working;
        Ok(())
    }

    async fn abort(self) -> Result<()> {
        Ok(())
    }
}
