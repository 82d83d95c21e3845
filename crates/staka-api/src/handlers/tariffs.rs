//! Public tariff catalog
//!
//! Unauthenticated. Only active tariffs, only the allow-listed fields of
//! [`PublicTariff`]. The full record type cannot be serialized, so the Stripe
//! references have no path into this response.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use staka_core::models::PublicTariff;
use std::sync::Arc;
use utoipa::ToSchema;

/// Guarantees advertised alongside the public catalog
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub only_active_tarifs: bool,
    pub stripe_fields_hidden: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicTariffsResponse {
    pub success: bool,
    pub data: Vec<PublicTariff>,
    pub message: String,
    pub security: SecurityInfo,
}

/// Keep active tariffs only, in `(ordre, created_at)` order.
///
/// The store query already filters and orders; this pass re-asserts both on the
/// materialized rows. The sort is stable, so ties keep their store order.
pub fn visible_tariffs(mut tariffs: Vec<PublicTariff>) -> Vec<PublicTariff> {
    tariffs.retain(|t| t.actif);
    tariffs.sort_by_key(PublicTariff::sort_key);
    tariffs
}

#[utoipa::path(
    get,
    path = "/tarifs",
    tag = "tarifs",
    responses(
        (status = 200, description = "Active tariffs, public fields only", body = PublicTariffsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_public_tariffs"))]
pub async fn list_public_tariffs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tariffs = state.tariffs.list_active_public().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load public tariffs");
        HttpAppError::from(e)
    })?;

    let data = visible_tariffs(tariffs);
    tracing::debug!(count = data.len(), "Public tariffs served");

    Ok(Json(PublicTariffsResponse {
        success: true,
        message: format!("{} active tariff(s) retrieved", data.len()),
        data,
        security: SecurityInfo {
            only_active_tarifs: true,
            stripe_fields_hidden: true,
        },
    }))
}
