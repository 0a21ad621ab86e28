//! Owned-package endpoints: issuance, redemption, and the expiry sweep.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{OwnPackage, OwnPackageId, OwnPackageStatus};
use serde::{Deserialize, Serialize};
use store::DocumentStore;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_order_id};

// -- Request types --

#[derive(Deserialize)]
pub struct UsePackageRequest {
    /// The course or event the package is redeemed against.
    pub ref_id: Uuid,
}

// -- Response types --

#[derive(Serialize)]
pub struct OwnPackageResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub order_id: Uuid,
    pub kind: String,
    pub status: OwnPackageStatus,
    pub expiry_date: DateTime<Utc>,
    pub purchased_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub ref_id: Option<Uuid>,
}

impl OwnPackageResponse {
    fn from_package(package: &OwnPackage) -> Self {
        Self {
            id: package.id().as_uuid(),
            user_id: package.user_id().as_uuid(),
            package_id: package.package_id().as_uuid(),
            order_id: package.order_id().as_uuid(),
            kind: package.kind().to_string(),
            status: package.status(),
            expiry_date: package.expiry_date(),
            purchased_at: package.purchased_at(),
            used_at: package.used_at(),
            ref_id: package.ref_id(),
        }
    }
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub updated_count: u64,
}

// -- Handlers --

/// POST /orders/{id}/packages — mint owned packages from a paid order.
#[tracing::instrument(skip(state))]
pub async fn create_from_order<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Vec<OwnPackageResponse>>), ApiError> {
    let order_id = parse_order_id(&id)?;
    let packages = state.issuer.create_from_order(order_id).await?;
    let responses = packages.iter().map(OwnPackageResponse::from_package).collect();
    Ok((StatusCode::CREATED, Json(responses)))
}

/// POST /packages/{id}/use — redeem a package against a course or event.
#[tracing::instrument(skip(state, req))]
pub async fn use_package<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UsePackageRequest>,
) -> Result<Json<OwnPackageResponse>, ApiError> {
    let package_id = parse_package_id(&id)?;
    let package = state.issuer.use_package(package_id, req.ref_id).await?;
    Ok(Json(OwnPackageResponse::from_package(&package)))
}

/// POST /packages/process-expired — sweep active packages past expiry.
///
/// Scheduler entry point; safe to call repeatedly.
#[tracing::instrument(skip(state))]
pub async fn process_expired<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SweepResponse>, ApiError> {
    let updated_count = state.issuer.process_expired().await?;
    Ok(Json(SweepResponse { updated_count }))
}

fn parse_package_id(id: &str) -> Result<OwnPackageId, ApiError> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OwnPackageId::from_uuid(uuid))
}
