//! Own-package issuance: minting, redemption, and the expiry sweep.

use chrono::Utc;
use common::OrderId;
use domain::{InventoryRef, OrderStatus, OrderType, OwnPackage, OwnPackageId};
use store::{DocumentStore, StoreSession};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// Issues and manages owned packages downstream of paid ads-package orders.
///
/// Issuance shares the atomicity model of the order coordinator: each
/// operation runs inside one store session, and a retry of
/// `create_from_order` finds the previously issued records instead of
/// minting duplicates.
pub struct PackageIssuer<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> PackageIssuer<S> {
    /// Creates a new issuer over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Converts a paid ads-package order into owned package records.
    ///
    /// Mints `quantity` records per line item with
    /// `expiry = now + catalog duration`. A line item whose catalog entry
    /// has disappeared is logged and skipped; every other failure aborts
    /// the whole batch.
    #[tracing::instrument(skip(self))]
    pub async fn create_from_order(&self, order_id: OrderId) -> Result<Vec<OwnPackage>> {
        let mut session = self.store.begin().await?;
        match Self::issue_in_session(&mut session, order_id).await {
            Ok(packages) => {
                session.commit().await?;
                metrics::counter!("own_packages_issued_total").increment(packages.len() as u64);
                Ok(packages)
            }
            Err(e) => {
                let _ = session.abort().await;
                tracing::warn!(%order_id, error = %e, "package issuance aborted");
                Err(e)
            }
        }
    }

    async fn issue_in_session(
        session: &mut S::Session,
        order_id: OrderId,
    ) -> Result<Vec<OwnPackage>> {
        let order = session
            .find_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if order.order_type() != OrderType::AdsPackage {
            return Err(CheckoutError::InvalidOrderType {
                order_id,
                expected: OrderType::AdsPackage,
                actual: order.order_type(),
            });
        }
        if !matches!(order.status(), OrderStatus::Paid | OrderStatus::Completed) {
            return Err(CheckoutError::OrderNotPaid {
                order_id,
                status: order.status(),
            });
        }

        // A retried call must not mint a second batch.
        let existing = session.find_own_packages_for_order(order_id).await?;
        if !existing.is_empty() {
            tracing::info!(%order_id, count = existing.len(), "packages already issued");
            return Ok(existing);
        }

        let now = Utc::now();
        let mut created = Vec::new();
        for (item_index, item) in order.items().iter().enumerate() {
            let package_id = match item.inventory {
                InventoryRef::AdsPackage { package_id } => package_id,
                // Ruled out by order validation; nothing to issue from.
                _ => continue,
            };

            let Some(catalog) = session.find_ads_package(package_id).await? else {
                tracing::warn!(%order_id, %package_id, "catalog entry missing, skipping line item");
                continue;
            };

            for sequence in 0..item.quantity {
                created.push(OwnPackage::issue(
                    order.user_id(),
                    &catalog,
                    order_id,
                    item_index as u32,
                    sequence,
                    now,
                ));
            }
        }

        session.insert_own_packages(&created).await?;
        Ok(created)
    }

    /// Redeems a package against a course or event, exactly once.
    #[tracing::instrument(skip(self))]
    pub async fn use_package(&self, package_id: OwnPackageId, ref_id: Uuid) -> Result<OwnPackage> {
        let mut session = self.store.begin().await?;
        match Self::redeem_in_session(&mut session, package_id, ref_id).await {
            Ok(package) => {
                session.commit().await?;
                Ok(package)
            }
            Err(e) => {
                let _ = session.abort().await;
                Err(e)
            }
        }
    }

    async fn redeem_in_session(
        session: &mut S::Session,
        package_id: OwnPackageId,
        ref_id: Uuid,
    ) -> Result<OwnPackage> {
        let mut package = session
            .find_own_package(package_id)
            .await?
            .ok_or(CheckoutError::OwnPackageNotFound(package_id))?;

        package.redeem(ref_id, Utc::now())?;
        session.update_own_package(&package).await?;
        Ok(package)
    }

    /// Moves every active package past its expiry to `Expired`.
    ///
    /// Intended as a scheduler entry point; a second run with no time
    /// passing finds nothing left to update.
    #[tracing::instrument(skip(self))]
    pub async fn process_expired(&self) -> Result<u64> {
        let mut session = self.store.begin().await?;
        match session.expire_due_packages(Utc::now()).await {
            Ok(updated) => {
                session.commit().await?;
                if updated > 0 {
                    metrics::counter!("own_packages_expired_total").increment(updated);
                    tracing::info!(updated, "expired packages swept");
                }
                Ok(updated)
            }
            Err(e) => {
                let _ = session.abort().await;
                Err(e.into())
            }
        }
    }
}
