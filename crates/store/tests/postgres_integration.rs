//! PostgreSQL integration tests.
//!
//! These tests share one PostgreSQL container and are ignored by default
//! because they need a running Docker daemon. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{
    AdsPackage, InventoryRef, LineItem, Money, Order, OrderStatus, OrderType, OwnPackage,
    OwnPackageStatus, PackageId, ShippingAddress, Variant, VariantId,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{DocumentStore, PostgresStore, StoreSession};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();
}

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/0001_init.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn connect_store() -> PostgresStore {
    let info = get_container_info().await;
    PostgresStore::connect(&info.connection_string).await.unwrap()
}

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

fn product_order(variant_id: VariantId, quantity: u32) -> Order {
    Order::place(
        UserId::new(),
        OrderType::Product,
        vec![LineItem::new(
            InventoryRef::Product { variant_id },
            Money::from_cents(1000),
            quantity,
        )],
        Money::from_cents(1000 * quantity as i64),
        address(),
    )
    .unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Docker daemon"]
async fn order_roundtrip_inside_transaction() {
    let store = connect_store().await;
    let order = product_order(VariantId::new(), 2);

    let mut session = store.begin().await.unwrap();
    session.insert_order(&order).await.unwrap();
    let loaded = session.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded, order);
    session.commit().await.unwrap();

    let mut session = store.begin().await.unwrap();
    let loaded = session.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Pending);
    session.abort().await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Docker daemon"]
async fn aborted_session_discards_writes() {
    let store = connect_store().await;
    let variant = Variant::new(VariantId::new(), 7);

    let mut session = store.begin().await.unwrap();
    session.put_variant(&variant).await.unwrap();
    session.abort().await.unwrap();

    let mut session = store.begin().await.unwrap();
    let missing = session.find_variant(variant.id()).await.unwrap();
    assert!(missing.is_none());
    session.abort().await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Docker daemon"]
async fn status_update_rewrites_document() {
    let store = connect_store().await;
    let order = product_order(VariantId::new(), 1);

    let mut session = store.begin().await.unwrap();
    session.insert_order(&order).await.unwrap();
    session
        .update_order_status(order.id(), OrderStatus::Paid)
        .await
        .unwrap();
    session.commit().await.unwrap();

    let mut session = store.begin().await.unwrap();
    let loaded = session.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Paid);
    session.abort().await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Docker daemon"]
async fn issuance_key_is_unique() {
    let store = connect_store().await;
    let catalog = AdsPackage::new(PackageId::new(), "banner", 30, Money::from_cents(900));
    let order_id = OrderId::new();
    let user_id = UserId::new();
    let now = Utc::now();

    let first = OwnPackage::issue(user_id, &catalog, order_id, 0, 0, now);
    let second = OwnPackage::issue(user_id, &catalog, order_id, 0, 0, now);

    let mut session = store.begin().await.unwrap();
    session.insert_own_packages(&[first]).await.unwrap();
    session.commit().await.unwrap();

    let mut session = store.begin().await.unwrap();
    let err = session.insert_own_packages(&[second]).await.unwrap_err();
    assert!(matches!(err, store::StoreError::Duplicate(_)));
    session.abort().await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Docker daemon"]
async fn expiry_sweep_is_idempotent() {
    let store = connect_store().await;
    let catalog = AdsPackage::new(PackageId::new(), "banner", 30, Money::from_cents(900));
    let past = Utc::now() - chrono::Duration::days(45);
    let package = OwnPackage::issue(UserId::new(), &catalog, OrderId::new(), 0, 0, past);

    let mut session = store.begin().await.unwrap();
    session.insert_own_packages(&[package.clone()]).await.unwrap();
    session.commit().await.unwrap();

    let mut session = store.begin().await.unwrap();
    let first = session.expire_due_packages(Utc::now()).await.unwrap();
    session.commit().await.unwrap();
    assert_eq!(first, 1);

    let mut session = store.begin().await.unwrap();
    let second = session.expire_due_packages(Utc::now()).await.unwrap();
    session.commit().await.unwrap();
    assert_eq!(second, 0);

    let mut session = store.begin().await.unwrap();
    let swept = session
        .find_own_package(package.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(swept.status(), OwnPackageStatus::Expired);
    session.abort().await.unwrap();
}
