//! Order transaction coordinator.

use common::{OrderId, UserId};
use domain::{LineItem, Money, Order, OrderStatus, OrderType, ShippingAddress};
use store::{DocumentStore, StoreSession};

use crate::adjust;
use crate::error::{CheckoutError, Result};

/// Input for order creation, assembled by the HTTP boundary.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    pub total_price: Money,
    pub shipping_address: ShippingAddress,
}

/// Orchestrates order creation and status transitions.
///
/// Each operation runs inside exactly one store session: inventory
/// adjustments and the order write either all become visible together or
/// leave no trace. Constructed with its store at startup and shared behind
/// whatever serves requests.
pub struct OrderCoordinator<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> OrderCoordinator<S> {
    /// Creates a new coordinator over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates the draft, consumes inventory for every line item, and
    /// persists the order, all-or-nothing.
    ///
    /// Line items are processed in input order; the first unsatisfiable
    /// item determines the reported error and aborts the whole scope.
    #[tracing::instrument(skip(self, draft), fields(order_type = %draft.order_type))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        metrics::counter!("orders_create_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let order = Order::place(
            draft.user_id,
            draft.order_type,
            draft.items,
            draft.total_price,
            draft.shipping_address,
        )?;

        let mut session = self.store.begin().await?;
        match Self::create_in_session(&mut session, &order).await {
            Ok(()) => {
                session.commit().await?;
                metrics::counter!("orders_created_total").increment(1);
                metrics::histogram!("order_create_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(order_id = %order.id(), "order created");
                Ok(order)
            }
            Err(e) => {
                // Roll back so no partial stock decrement survives, then
                // surface the original failure.
                let _ = session.abort().await;
                metrics::counter!("orders_create_failures_total").increment(1);
                tracing::warn!(error = %e, "order creation aborted");
                Err(e)
            }
        }
    }

    async fn create_in_session(session: &mut S::Session, order: &Order) -> Result<()> {
        adjust::consume_order(session, order.items()).await?;
        session.insert_order(order).await?;
        Ok(())
    }

    /// Applies a status change, rolling inventory back exactly once when
    /// the order enters the cancelled/failed class.
    ///
    /// A same-status update commits without touching anything and returns
    /// the order unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let mut session = self.store.begin().await?;
        match Self::update_in_session(&mut session, order_id, new_status).await {
            Ok(order) => {
                session.commit().await?;
                Ok(order)
            }
            Err(e) => {
                let _ = session.abort().await;
                tracing::warn!(%order_id, error = %e, "status update aborted");
                Err(e)
            }
        }
    }

    async fn update_in_session(
        session: &mut S::Session,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let mut order = session
            .find_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        let old_status = order.status();
        if old_status == new_status {
            return Ok(order);
        }

        if new_status.requires_rollback_from(old_status) {
            adjust::release_order(session, order.items()).await?;
            metrics::counter!("order_inventory_rollbacks_total").increment(1);
            tracing::info!(%order_id, %old_status, %new_status, "inventory returned");
        }

        session.update_order_status(order_id, new_status).await?;
        order.set_status(new_status);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Course, CourseId, InventoryRef, Variant, VariantId};
    use store::InMemoryStore;

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Dana Smith".to_string(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: "US".to_string(),
            phone: None,
        }
    }

    fn product_draft(variant_id: VariantId, quantity: u32) -> OrderDraft {
        OrderDraft {
            user_id: UserId::new(),
            order_type: OrderType::Product,
            items: vec![LineItem::new(
                InventoryRef::Product { variant_id },
                Money::from_cents(1000),
                quantity,
            )],
            total_price: Money::from_cents(1000 * quantity as i64),
            shipping_address: address(),
        }
    }

    #[tokio::test]
    async fn create_order_consumes_stock_and_persists() {
        let store = InMemoryStore::new();
        let variant = Variant::new(VariantId::new(), 5);
        let variant_id = variant.id();
        store.seed_variant(variant).await;

        let coordinator = OrderCoordinator::new(store.clone());
        let order = coordinator
            .create_order(product_draft(variant_id, 3))
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(store.variant_stock(variant_id).await, Some(2));
        assert!(store.get_order(order.id()).await.is_some());
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_everything_untouched() {
        let store = InMemoryStore::new();
        let variant = Variant::new(VariantId::new(), 2);
        let variant_id = variant.id();
        store.seed_variant(variant).await;

        let coordinator = OrderCoordinator::new(store.clone());
        let err = coordinator
            .create_order(product_draft(variant_id, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Domain(_)));
        assert_eq!(store.variant_stock(variant_id).await, Some(2));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn validation_failure_reaches_no_inventory() {
        let store = InMemoryStore::new();
        let variant = Variant::new(VariantId::new(), 5);
        let variant_id = variant.id();
        store.seed_variant(variant).await;

        let mut draft = product_draft(variant_id, 2);
        draft.total_price = Money::from_cents(1); // declared total disagrees

        let coordinator = OrderCoordinator::new(store.clone());
        let err = coordinator.create_order(draft).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Domain(_)));
        assert_eq!(store.variant_stock(variant_id).await, Some(5));
    }

    #[tokio::test]
    async fn unknown_order_cannot_change_status() {
        let store = InMemoryStore::new();
        let coordinator = OrderCoordinator::new(store);

        let err = coordinator
            .update_order_status(OrderId::new(), OrderStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn same_status_update_is_a_no_op() {
        let store = InMemoryStore::new();
        let course = Course::new(CourseId::new(), 10);
        let course_id = course.id();
        store.seed_course(course).await;

        let coordinator = OrderCoordinator::new(store.clone());
        let order = coordinator
            .create_order(OrderDraft {
                user_id: UserId::new(),
                order_type: OrderType::Course,
                items: vec![LineItem::new(
                    InventoryRef::Course { course_id },
                    Money::from_cents(2000),
                    2,
                )],
                total_price: Money::from_cents(4000),
                shipping_address: address(),
            })
            .await
            .unwrap();
        assert_eq!(store.course_slots(course_id).await, Some(8));

        let unchanged = coordinator
            .update_order_status(order.id(), OrderStatus::Pending)
            .await
            .unwrap();

        assert_eq!(unchanged.status(), OrderStatus::Pending);
        assert_eq!(store.course_slots(course_id).await, Some(8));
    }

    #[tokio::test]
    async fn payment_transitions_do_not_touch_inventory() {
        let store = InMemoryStore::new();
        let variant = Variant::new(VariantId::new(), 5);
        let variant_id = variant.id();
        store.seed_variant(variant).await;

        let coordinator = OrderCoordinator::new(store.clone());
        let order = coordinator
            .create_order(product_draft(variant_id, 3))
            .await
            .unwrap();

        coordinator
            .update_order_status(order.id(), OrderStatus::Paid)
            .await
            .unwrap();
        coordinator
            .update_order_status(order.id(), OrderStatus::Completed)
            .await
            .unwrap();

        assert_eq!(store.variant_stock(variant_id).await, Some(2));
    }

    #[tokio::test]
    async fn cancellation_rolls_back_exactly_once() {
        let store = InMemoryStore::new();
        let variant = Variant::new(VariantId::new(), 5);
        let variant_id = variant.id();
        store.seed_variant(variant).await;

        let coordinator = OrderCoordinator::new(store.clone());
        let order = coordinator
            .create_order(product_draft(variant_id, 3))
            .await
            .unwrap();
        assert_eq!(store.variant_stock(variant_id).await, Some(2));

        let cancelled = coordinator
            .update_order_status(order.id(), OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(store.variant_stock(variant_id).await, Some(5));

        // Moving within the released class must not return units again.
        coordinator
            .update_order_status(order.id(), OrderStatus::Failed)
            .await
            .unwrap();
        assert_eq!(store.variant_stock(variant_id).await, Some(5));
    }
}
