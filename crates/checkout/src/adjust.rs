//! Per-inventory-kind adjusters.
//!
//! An adjustment delta is negative for consumption (order creation) and
//! positive for release (rollback). Dispatch is an exhaustive match on the
//! line item's [`InventoryRef`], so adding an inventory kind without an
//! adjuster does not compile.

use domain::{InventoryRef, LineItem, Variant};
use store::StoreSession;

use crate::error::{CheckoutError, Result};

/// Applies a signed quantity adjustment to the unit behind `inventory`.
pub async fn apply<S: StoreSession>(
    session: &mut S,
    inventory: &InventoryRef,
    delta: i64,
) -> Result<()> {
    match *inventory {
        InventoryRef::Product { variant_id } => {
            let mut variant = session
                .find_variant(variant_id)
                .await?
                .ok_or(CheckoutError::VariantNotFound(variant_id))?;
            variant.adjust_stock(delta)?;
            session.put_variant(&variant).await?;
        }
        InventoryRef::Course { course_id } => {
            let mut course = session
                .find_course(course_id)
                .await?
                .ok_or(CheckoutError::CourseNotFound(course_id))?;
            course.adjust_slots(delta)?;
            session.put_course(&course).await?;
        }
        InventoryRef::Ticket {
            event_id,
            seat_zone_id,
        } => {
            let mut event = session
                .find_event(event_id)
                .await?
                .ok_or(CheckoutError::EventNotFound(event_id))?;
            event.adjust_zone(seat_zone_id, delta)?;
            session.put_event(&event).await?;
        }
        // Ads packages carry no counter; the no-op keeps dispatch uniform.
        InventoryRef::AdsPackage { .. } => {}
    }
    Ok(())
}

/// Consumes inventory for every line item, in input order.
///
/// The first unsatisfiable item aborts the loop, so the error reported to
/// the caller is deterministic.
pub async fn consume_order<S: StoreSession>(session: &mut S, items: &[LineItem]) -> Result<()> {
    for item in items {
        apply(session, &item.inventory, -(item.quantity as i64)).await?;
    }
    Ok(())
}

/// Returns previously consumed inventory for every line item.
///
/// Product restocks are accumulated and written back through one batched
/// `put_variants` call; course and ticket items are applied individually.
pub async fn release_order<S: StoreSession>(session: &mut S, items: &[LineItem]) -> Result<()> {
    let mut restocked: Vec<Variant> = Vec::new();

    for item in items {
        let delta = item.quantity as i64;
        match item.inventory {
            InventoryRef::Product { variant_id } => {
                // The same variant may appear in several items; adjust the
                // already-loaded copy instead of re-reading a stale one.
                if let Some(variant) = restocked.iter_mut().find(|v| v.id() == variant_id) {
                    variant.adjust_stock(delta)?;
                } else {
                    let mut variant = session
                        .find_variant(variant_id)
                        .await?
                        .ok_or(CheckoutError::VariantNotFound(variant_id))?;
                    variant.adjust_stock(delta)?;
                    restocked.push(variant);
                }
            }
            _ => apply(session, &item.inventory, delta).await?,
        }
    }

    if !restocked.is_empty() {
        session.put_variants(&restocked).await?;
    }
    Ok(())
}
