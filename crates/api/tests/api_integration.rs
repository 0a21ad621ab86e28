//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{AdsPackage, Course, CourseId, Money, PackageId, Variant, VariantId};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = api::create_state(store.clone());
    let app = api::create_app(state, get_metrics_handle());
    (app, store)
}

fn address_json() -> serde_json::Value {
    serde_json::json!({
        "recipient": "Dana Smith",
        "street": "1 Main St",
        "city": "Springfield",
        "postal_code": "12345",
        "country": "US"
    })
}

async fn post_json(app: &axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => builder
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_check() {
    let (app, _) = setup();
    let (status, json) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn create_product_order_consumes_stock() {
    let (app, store) = setup();
    let variant = Variant::new(VariantId::new(), 5);
    let variant_id = variant.id();
    store.seed_variant(variant).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "product",
        "items": [{
            "ref_id": variant_id.as_uuid(),
            "price_cents": 1000,
            "quantity": 3
        }],
        "total_cents": 3000,
        "shipping_address": address_json()
    });

    let (status, json) = post_json(&app, "/orders", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["total_cents"], 3000);
    assert_eq!(store.variant_stock(variant_id).await, Some(2));
}

#[tokio::test]
async fn insufficient_stock_is_a_client_error() {
    let (app, store) = setup();
    let variant = Variant::new(VariantId::new(), 2);
    let variant_id = variant.id();
    store.seed_variant(variant).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "product",
        "items": [{
            "ref_id": variant_id.as_uuid(),
            "price_cents": 1000,
            "quantity": 3
        }],
        "total_cents": 3000,
        "shipping_address": address_json()
    });

    let (status, json) = post_json(&app, "/orders", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("stock"));
    assert_eq!(store.variant_stock(variant_id).await, Some(2));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn unknown_inventory_unit_is_not_found() {
    let (app, _) = setup();

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "course",
        "items": [{
            "ref_id": uuid::Uuid::new_v4(),
            "price_cents": 1000,
            "quantity": 1
        }],
        "total_cents": 1000,
        "shipping_address": address_json()
    });

    let (status, _) = post_json(&app, "/orders", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn total_mismatch_is_rejected() {
    let (app, store) = setup();
    let course = Course::new(CourseId::new(), 10);
    let course_id = course.id();
    store.seed_course(course).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "course",
        "items": [{
            "ref_id": course_id.as_uuid(),
            "price_cents": 1000,
            "quantity": 2
        }],
        "total_cents": 2500,
        "shipping_address": address_json()
    });

    let (status, json) = post_json(&app, "/orders", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("total"));
    assert_eq!(store.course_slots(course_id).await, Some(10));
}

#[tokio::test]
async fn status_patch_cancels_and_restores_stock() {
    let (app, store) = setup();
    let variant = Variant::new(VariantId::new(), 5);
    let variant_id = variant.id();
    store.seed_variant(variant).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "product",
        "items": [{
            "ref_id": variant_id.as_uuid(),
            "price_cents": 1000,
            "quantity": 3
        }],
        "total_cents": 3000,
        "shipping_address": address_json()
    });
    let (_, created) = post_json(&app, "/orders", body).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let (status, json) = send_json(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "cancelled");
    assert_eq!(store.variant_stock(variant_id).await, Some(5));

    let (status, loaded) =
        send_json(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["status"], "cancelled");
}

#[tokio::test]
async fn invalid_status_value_is_a_bad_request() {
    let (app, store) = setup();
    let variant = Variant::new(VariantId::new(), 5);
    let variant_id = variant.id();
    store.seed_variant(variant).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "product",
        "items": [{
            "ref_id": variant_id.as_uuid(),
            "price_cents": 1000,
            "quantity": 1
        }],
        "total_cents": 1000,
        "shipping_address": address_json()
    });
    let (_, created) = post_json(&app, "/orders", body).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let (status, json) = send_json(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "refunded" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("refunded"));
}

#[tokio::test]
async fn status_patch_on_unknown_order_is_not_found() {
    let (app, _) = setup();
    let (status, _) = send_json(
        &app,
        "PATCH",
        &format!("/orders/{}/status", uuid::Uuid::new_v4()),
        Some(serde_json::json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ads_package_flow_end_to_end() {
    let (app, store) = setup();
    let catalog = AdsPackage::new(PackageId::new(), "banner", 30, Money::from_cents(4900));
    let package_id = catalog.id();
    store.seed_ads_package(catalog).await;

    // Create and pay for the order.
    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "ads_package",
        "items": [{
            "ref_id": package_id.as_uuid(),
            "price_cents": 4900,
            "quantity": 2
        }],
        "total_cents": 9800,
        "shipping_address": address_json()
    });
    let (_, created) = post_json(&app, "/orders", body).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    send_json(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "paid" })),
    )
    .await;

    // Mint owned packages.
    let (status, packages) = post_json(
        &app,
        &format!("/orders/{order_id}/packages"),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let packages = packages.as_array().unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0]["status"], "active");

    // Redeem one.
    let own_id = packages[0]["id"].as_str().unwrap();
    let (status, used) = post_json(
        &app,
        &format!("/packages/{own_id}/use"),
        serde_json::json!({ "ref_id": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(used["status"], "used");

    // Nothing is past expiry yet.
    let (status, sweep) = post_json(
        &app,
        "/packages/process-expired",
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sweep["updated_count"], 0);
}

#[tokio::test]
async fn issuance_for_unpaid_order_is_rejected() {
    let (app, store) = setup();
    let catalog = AdsPackage::new(PackageId::new(), "banner", 30, Money::from_cents(4900));
    let package_id = catalog.id();
    store.seed_ads_package(catalog).await;

    let body = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "order_type": "ads_package",
        "items": [{
            "ref_id": package_id.as_uuid(),
            "price_cents": 4900,
            "quantity": 1
        }],
        "total_cents": 4900,
        "shipping_address": address_json()
    });
    let (_, created) = post_json(&app, "/orders", body).await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        &app,
        &format!("/orders/{order_id}/packages"),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let (app, _) = setup();
    let (status, _) = send_json(&app, "GET", "/orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
