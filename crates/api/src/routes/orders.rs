//! Order creation and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{OrderCoordinator, OrderDraft, PackageIssuer};
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{
    InventoryRef, LineItem, Money, Order, OrderStatus, OrderType, ShippingAddress,
};
use serde::{Deserialize, Serialize};
use store::DocumentStore;
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub coordinator: OrderCoordinator<S>,
    pub issuer: PackageIssuer<S>,
    pub store: S,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub order_type: OrderType,
    pub items: Vec<OrderItemRequest>,
    pub total_cents: i64,
    pub shipping_address: ShippingAddress,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    /// The inventory unit reference: variant, course, event, or package ID
    /// depending on the order type.
    pub ref_id: Uuid,
    /// Seat zone within the event; required for ticket orders.
    pub seat_zone_id: Option<Uuid>,
    pub price_cents: i64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    /// One of `pending|paid|completed|cancelled|failed`; parsed by hand so
    /// an unknown value maps to 400 rather than a body-rejection status.
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total_cents: i64,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub(crate) fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().as_uuid(),
            user_id: order.user_id().as_uuid(),
            order_type: order.order_type(),
            status: order.status(),
            items: order.items().to_vec(),
            total_cents: order.total_price().cents(),
            shipping_address: order.shipping_address().clone(),
            created_at: order.created_at(),
        }
    }
}

// -- Handlers --

/// POST /orders — create a new order, consuming inventory atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let items = req
        .items
        .iter()
        .map(|item| item_to_line_item(req.order_type, item))
        .collect::<Result<Vec<_>, ApiError>>()?;

    let draft = OrderDraft {
        user_id: UserId::from_uuid(req.user_id),
        order_type: req.order_type,
        items,
        total_price: Money::from_cents(req.total_cents),
        shipping_address: req.shipping_address,
    };

    let order = state.coordinator.create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from_order(&order))))
}

/// GET /orders/{id} — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = load_order(&state.store, order_id).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// PATCH /orders/{id}/status — apply a status transition.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status = parse_status(&req.status)?;
    let order = state
        .coordinator
        .update_order_status(order_id, status)
        .await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

fn parse_status(value: &str) -> Result<OrderStatus, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| ApiError::BadRequest(format!("Invalid status value: {value}")))
}

fn item_to_line_item(
    order_type: OrderType,
    item: &OrderItemRequest,
) -> Result<LineItem, ApiError> {
    let inventory = match order_type {
        OrderType::Product => InventoryRef::Product {
            variant_id: item.ref_id.into(),
        },
        OrderType::Course => InventoryRef::Course {
            course_id: item.ref_id.into(),
        },
        OrderType::Ticket => {
            let seat_zone_id = item.seat_zone_id.ok_or_else(|| {
                ApiError::BadRequest("seat_zone_id is required for ticket items".to_string())
            })?;
            InventoryRef::Ticket {
                event_id: item.ref_id.into(),
                seat_zone_id: seat_zone_id.into(),
            }
        }
        OrderType::AdsPackage => InventoryRef::AdsPackage {
            package_id: item.ref_id.into(),
        },
    };

    Ok(LineItem::new(
        inventory,
        Money::from_cents(item.price_cents),
        item.quantity,
    ))
}

pub(crate) async fn load_order<S: DocumentStore>(
    store: &S,
    order_id: OrderId,
) -> Result<Order, ApiError> {
    use store::StoreSession;

    let mut session = store
        .begin()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let order = session
        .find_order(order_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let _ = session.abort().await;
    order.ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
