//! Admin tariff management. Sole writer of the tariff catalog.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use staka_core::models::{AdminTariff, CreateTariffRequest, NewTariff, UpdateTariffRequest};
use staka_core::AppError;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn tariff_not_found(id: Uuid) -> HttpAppError {
    HttpAppError(AppError::NotFound(format!("Tariff {} not found", id)))
}

#[utoipa::path(
    get,
    path = "/admin/tarifs",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All tariffs, active or not", body = ApiResponse<Vec<AdminTariff>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_tariffs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tariffs = state.tariffs.list_all().await?;
    let data: Vec<AdminTariff> = tariffs.into_iter().map(AdminTariff::from).collect();
    let message = format!("{} tariff(s) retrieved", data.len());
    Ok(Json(ApiResponse::ok(data, message)))
}

#[utoipa::path(
    get,
    path = "/admin/tarifs/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff", body = ApiResponse<AdminTariff>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
pub async fn get_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tariff = state
        .tariffs
        .get(id)
        .await?
        .ok_or_else(|| tariff_not_found(id))?;
    Ok(Json(ApiResponse::ok(
        AdminTariff::from(tariff),
        "Tariff retrieved",
    )))
}

#[utoipa::path(
    post,
    path = "/admin/tarifs",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateTariffRequest,
    responses(
        (status = 201, description = "Tariff created", body = ApiResponse<AdminTariff>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_tariff"))]
pub async fn create_tariff(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTariffRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let tariff = state.tariffs.create(NewTariff::from(request)).await?;
    tracing::info!(tariff_id = %tariff.id, "Tariff created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AdminTariff::from(tariff), "Tariff created")),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/tarifs/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tariff ID")),
    request_body = UpdateTariffRequest,
    responses(
        (status = 200, description = "Tariff updated", body = ApiResponse<AdminTariff>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_tariff", tariff_id = %id))]
pub async fn update_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTariffRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let mut tariff = state
        .tariffs
        .get(id)
        .await?
        .ok_or_else(|| tariff_not_found(id))?;
    tariff.apply(request, Utc::now());

    let updated = state
        .tariffs
        .update(&tariff)
        .await?
        .ok_or_else(|| tariff_not_found(id))?;
    tracing::info!("Tariff updated");

    Ok(Json(ApiResponse::ok(
        AdminTariff::from(updated),
        "Tariff updated",
    )))
}

#[utoipa::path(
    patch,
    path = "/admin/tarifs/{id}/toggle",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Active flag flipped", body = ApiResponse<AdminTariff>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "toggle_tariff", tariff_id = %id))]
pub async fn toggle_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tariff = state
        .tariffs
        .toggle_active(id)
        .await?
        .ok_or_else(|| tariff_not_found(id))?;
    tracing::info!(actif = tariff.actif, "Tariff visibility toggled");

    let message = if tariff.actif {
        "Tariff activated"
    } else {
        "Tariff deactivated"
    };
    Ok(Json(ApiResponse::ok(AdminTariff::from(tariff), message)))
}

#[utoipa::path(
    delete,
    path = "/admin/tarifs/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_tariff", tariff_id = %id))]
pub async fn delete_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.tariffs.delete(id).await? {
        return Err(tariff_not_found(id));
    }
    tracing::info!("Tariff deleted");
    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "id": id }),
        "Tariff deleted",
    )))
}
