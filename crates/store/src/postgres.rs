use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    AdsPackage, Course, CourseId, EventId, EventListing, Order, OrderStatus, OwnPackage,
    OwnPackageId, PackageId, Variant, VariantId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{DocumentStore, StoreSession};

/// PostgreSQL-backed document store.
///
/// Every entity lives in its own table as a JSONB document plus the columns
/// the store filters on (order status, package expiry, the issuance key).
/// A session wraps one database transaction, so commit/abort semantics come
/// straight from the engine.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL document store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    type Session = PostgresSession;

    async fn begin(&self) -> Result<PostgresSession> {
        let tx = self.pool.begin().await?;
        Ok(PostgresSession { tx })
    }
}

/// Unit of work wrapping one PostgreSQL transaction.
pub struct PostgresSession {
    tx: Transaction<'static, Postgres>,
}

impl PostgresSession {
    async fn fetch_doc<T: DeserializeOwned>(&mut self, table: &str, id: Uuid) -> Result<Option<T>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as(&format!("SELECT doc FROM {table} WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;

        match row {
            Some((doc,)) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn upsert_doc<T: Serialize>(&mut self, table: &str, id: Uuid, entity: &T) -> Result<()> {
        let doc = serde_json::to_value(entity)?;
        sqlx::query(&format!(
            "INSERT INTO {table} (id, doc) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc"
        ))
        .bind(id)
        .bind(doc)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StoreSession for PostgresSession {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        let doc = serde_json::to_value(order)?;
        sqlx::query("INSERT INTO orders (id, status, doc) VALUES ($1, $2, $3)")
            .bind(order.id().as_uuid())
            .bind(order.status().as_str())
            .bind(doc)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    StoreError::Duplicate(format!("order {}", order.id()))
                }
                _ => StoreError::Database(e),
            })?;
        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        self.fetch_doc("orders", id.as_uuid()).await
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        sqlx::query(
            "UPDATE orders \
             SET status = $2, doc = jsonb_set(doc, '{status}', to_jsonb($2::text)) \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_variant(&mut self, id: VariantId) -> Result<Option<Variant>> {
        self.fetch_doc("variants", id.as_uuid()).await
    }

    async fn put_variant(&mut self, variant: &Variant) -> Result<()> {
        self.upsert_doc("variants", variant.id().as_uuid(), variant)
            .await
    }

    async fn put_variants(&mut self, variants: &[Variant]) -> Result<()> {
        for variant in variants {
            self.upsert_doc("variants", variant.id().as_uuid(), variant)
                .await?;
        }
        Ok(())
    }

    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>> {
        self.fetch_doc("courses", id.as_uuid()).await
    }

    async fn put_course(&mut self, course: &Course) -> Result<()> {
        self.upsert_doc("courses", course.id().as_uuid(), course)
            .await
    }

    async fn find_event(&mut self, id: EventId) -> Result<Option<EventListing>> {
        self.fetch_doc("events", id.as_uuid()).await
    }

    async fn put_event(&mut self, event: &EventListing) -> Result<()> {
        self.upsert_doc("events", event.id().as_uuid(), event).await
    }

    async fn find_ads_package(&mut self, id: PackageId) -> Result<Option<AdsPackage>> {
        self.fetch_doc("ads_packages", id.as_uuid()).await
    }

    async fn put_ads_package(&mut self, package: &AdsPackage) -> Result<()> {
        self.upsert_doc("ads_packages", package.id().as_uuid(), package)
            .await
    }

    async fn insert_own_packages(&mut self, packages: &[OwnPackage]) -> Result<()> {
        for package in packages {
            let doc = serde_json::to_value(package)?;
            sqlx::query(
                "INSERT INTO own_packages \
                 (id, order_id, item_index, seq, status, expiry_date, doc) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(package.id().as_uuid())
            .bind(package.order_id().as_uuid())
            .bind(package.item_index() as i32)
            .bind(package.sequence() as i32)
            .bind(package.status().as_str())
            .bind(package.expiry_date())
            .bind(doc)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err)
                    if db_err.constraint() == Some("unique_issuance") =>
                {
                    StoreError::Duplicate(format!(
                        "own package for order {} item {} seq {}",
                        package.order_id(),
                        package.item_index(),
                        package.sequence()
                    ))
                }
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    StoreError::Duplicate(format!("own package {}", package.id()))
                }
                _ => StoreError::Database(e),
            })?;
        }
        Ok(())
    }

    async fn find_own_package(&mut self, id: OwnPackageId) -> Result<Option<OwnPackage>> {
        self.fetch_doc("own_packages", id.as_uuid()).await
    }

    async fn find_own_packages_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<OwnPackage>> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT doc FROM own_packages WHERE order_id = $1 ORDER BY item_index, seq",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|(doc,)| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    async fn update_own_package(&mut self, package: &OwnPackage) -> Result<()> {
        let doc = serde_json::to_value(package)?;
        sqlx::query("UPDATE own_packages SET status = $2, doc = $3 WHERE id = $1")
            .bind(package.id().as_uuid())
            .bind(package.status().as_str())
            .bind(doc)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn expire_due_packages(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE own_packages \
             SET status = 'expired', doc = jsonb_set(doc, '{status}', '\"expired\"') \
             WHERE status = 'active' AND expiry_date < $1",
        )
        .bind(now)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn abort(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
