//! `customerAdvance.*` / `vendorAdvance.*` (spec §6). Single-line
//! cash-against-clearing documents; applying either happens through the
//! owning invoice/bill's `apply-customer-advance` / `apply-vendor-advance`
//! routes, not here.

use crate::command::execute;
use crate::dto::{DocumentResponse, EmptyRequest, VoidRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use documents_rs::repos::company_repo;
use documents_rs::services::advance_service;
use documents_rs::{CreateCustomerAdvanceInput, CreateVendorAdvanceInput, DocumentError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/customer-advances", post(create_customer_advance))
        .route(
            "/api/v1/customer-advances/:id/post",
            post(post_advance),
        )
        .route("/api/v1/customer-advances/:id/void", post(void_advance))
        .route(
            "/api/v1/customer-advances/:id",
            delete(delete_advance),
        )
        .route("/api/v1/vendor-advances", post(create_vendor_advance))
        .route("/api/v1/vendor-advances/:id/post", post(post_advance))
        .route("/api/v1/vendor-advances/:id/void", post(void_advance))
        .route("/api/v1/vendor-advances/:id", delete(delete_advance))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateCustomerAdvanceRequest {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub bank_account_id: Uuid,
    pub clearing_account_id: Uuid,
    #[schema(value_type = String)]
    pub amount: money_rs::Money,
}

#[utoipa::path(
    post,
    path = "/api/v1/customer-advances",
    tag = "advance",
    request_body = CreateCustomerAdvanceRequest,
    responses((status = 201, description = "customer advance created", body = DocumentResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn create_customer_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCustomerAdvanceRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "customerAdvance.create",
        None,
        &req,
        move |ctx, tx| async move {
            let header = advance_service::create_customer_advance(
                tx,
                &ctx,
                CreateCustomerAdvanceInput {
                    date: body.date,
                    location_id: body.location_id,
                    currency: body.currency,
                    bank_account_id: body.bank_account_id,
                    clearing_account_id: body.clearing_account_id,
                    amount: body.amount,
                },
            )
            .await
            .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    let status = if replayed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(response)))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateVendorAdvanceRequest {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub bank_account_id: Uuid,
    #[schema(value_type = String)]
    pub amount: money_rs::Money,
}

#[utoipa::path(
    post,
    path = "/api/v1/vendor-advances",
    tag = "advance",
    request_body = CreateVendorAdvanceRequest,
    responses((status = 201, description = "vendor advance created", body = DocumentResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn create_vendor_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateVendorAdvanceRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "vendorAdvance.create",
        None,
        &req,
        move |ctx, tx| async move {
            let company = company_repo::find_by_id(tx, ctx.company_id.0)
                .await
                .map_err(DocumentError::from)
                .map_err(ApiError::from)?
                .ok_or_else(|| {
                    ApiError::from(DocumentError::NotFound(format!(
                        "company {}",
                        ctx.company_id.0
                    )))
                })?;
            let header = advance_service::create_vendor_advance(
                tx,
                &ctx,
                &company,
                CreateVendorAdvanceInput {
                    date: body.date,
                    location_id: body.location_id,
                    currency: body.currency,
                    bank_account_id: body.bank_account_id,
                    amount: body.amount,
                },
            )
            .await
            .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    let status = if replayed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer-advances/{id}/post",
    tag = "advance",
    params(
        ("id" = Uuid, Path, description = "advance document id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "advance posted to the ledger", body = DocumentResponse))
)]
pub(crate) async fn post_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (_, response) = execute(
        &state,
        &headers,
        "advance.post",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = advance_service::post(tx, &ctx, id)
                .await
                .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer-advances/{id}/void",
    tag = "advance",
    params(
        ("id" = Uuid, Path, description = "advance document id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = VoidRequest,
    responses((status = 200, description = "advance voided", body = DocumentResponse))
)]
pub(crate) async fn void_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<VoidRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "advance.void",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = advance_service::void(tx, &ctx, id, body.reason)
                .await
                .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customer-advances/{id}",
    tag = "advance",
    params(
        ("id" = Uuid, Path, description = "advance document id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    responses((status = 204, description = "advance deleted"))
)]
pub(crate) async fn delete_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<StatusCode, ApiError> {
    let (_, ()) = execute(
        &state,
        &headers,
        "advance.delete",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            advance_service::delete(tx, &ctx, id)
                .await
                .map_err(ApiError::from)?;
            Ok(())
        },
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
