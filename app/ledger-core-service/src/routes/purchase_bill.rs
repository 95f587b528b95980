//! `purchaseBill.*` (spec §4.4.3, §4.9, §6).

use crate::command::execute;
use crate::dto::{
    ApplyPaymentRequest, ApplySettlementRequest, DocumentLineRequest, DocumentResponse,
    EmptyRequest, SettlementResponse, VoidRequest,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use documents_rs::services::purchase_bill_service;
use documents_rs::CreatePurchaseBillInput;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/purchase-bills", post(create))
        .route("/api/v1/purchase-bills/:id/approve", post(approve))
        .route("/api/v1/purchase-bills/:id/post", post(post_bill))
        .route("/api/v1/purchase-bills/:id/adjust", post(adjust))
        .route("/api/v1/purchase-bills/:id/void", post(void))
        .route("/api/v1/purchase-bills/:id", delete(delete_bill))
        .route(
            "/api/v1/purchase-bills/:id/apply-payment",
            post(apply_payment),
        )
        .route(
            "/api/v1/purchase-bills/:id/apply-vendor-credit",
            post(apply_vendor_credit),
        )
        .route(
            "/api/v1/purchase-bills/:id/apply-vendor-advance",
            post(apply_vendor_advance),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatePurchaseBillRequest {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub ap_account_id: Uuid,
    pub linked_receipt_id: Option<Uuid>,
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-bills",
    tag = "purchase-bill",
    request_body = CreatePurchaseBillRequest,
    responses((status = 201, description = "purchase bill created", body = DocumentResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePurchaseBillRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "purchaseBill.create",
        None,
        &req,
        move |ctx, tx| async move {
            let header = purchase_bill_service::create(
                tx,
                &ctx,
                CreatePurchaseBillInput {
                    date: body.date,
                    location_id: body.location_id,
                    currency: body.currency,
                    ap_account_id: body.ap_account_id,
                    linked_receipt_id: body.linked_receipt_id,
                    lines: body.lines.into_iter().map(Into::into).collect(),
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
    path = "/api/v1/purchase-bills/{id}/approve",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "purchase bill approved", body = DocumentResponse))
)]
pub(crate) async fn approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.approve",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = purchase_bill_service::approve(tx, &ctx, id)
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
    path = "/api/v1/purchase-bills/{id}/post",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "purchase bill posted to the ledger", body = DocumentResponse))
)]
pub(crate) async fn post_bill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.post",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = purchase_bill_service::post(tx, &ctx, id)
                .await
                .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    Ok(Json(response))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdjustPurchaseBillRequest {
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-bills/{id}/adjust",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = AdjustPurchaseBillRequest,
    responses((status = 200, description = "net-delta adjustment posted", body = DocumentResponse))
)]
pub(crate) async fn adjust(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustPurchaseBillRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.adjust",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let lines = body.lines.into_iter().map(Into::into).collect();
            let header = purchase_bill_service::adjust(tx, &ctx, id, lines)
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
    path = "/api/v1/purchase-bills/{id}/void",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = VoidRequest,
    responses((status = 200, description = "purchase bill voided", body = DocumentResponse))
)]
pub(crate) async fn void(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<VoidRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.void",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = purchase_bill_service::void(tx, &ctx, id, body.reason)
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
    path = "/api/v1/purchase-bills/{id}",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    responses((status = 204, description = "purchase bill deleted"))
)]
pub(crate) async fn delete_bill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<StatusCode, ApiError> {
    let (_, ()) = execute(
        &state,
        &headers,
        "purchaseBill.delete",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            purchase_bill_service::delete(tx, &ctx, id)
                .await
                .map_err(ApiError::from)?;
            Ok(())
        },
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-bills/{id}/apply-payment",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplyPaymentRequest,
    responses((status = 200, description = "payment recorded against the bill", body = SettlementResponse))
)]
pub(crate) async fn apply_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyPaymentRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.applyPayment",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = purchase_bill_service::apply_payment(
                tx,
                &ctx,
                id,
                body.bank_account_id,
                body.clearing_account_id,
                body.date,
                body.amount,
            )
            .await
            .map_err(ApiError::from)?;
            Ok(SettlementResponse::from(outcome))
        },
    )
    .await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-bills/{id}/apply-vendor-credit",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplySettlementRequest,
    responses((status = 200, description = "vendor credit applied against the bill", body = SettlementResponse))
)]
pub(crate) async fn apply_vendor_credit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplySettlementRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.applyVendorCredit",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = purchase_bill_service::apply_vendor_credit(
                tx,
                &ctx,
                id,
                body.source_id,
                body.clearing_account_id,
                body.date,
                body.amount,
            )
            .await
            .map_err(ApiError::from)?;
            Ok(SettlementResponse::from(outcome))
        },
    )
    .await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-bills/{id}/apply-vendor-advance",
    tag = "purchase-bill",
    params(
        ("id" = Uuid, Path, description = "purchase bill id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplySettlementRequest,
    responses((status = 200, description = "vendor advance applied against the bill", body = SettlementResponse))
)]
pub(crate) async fn apply_vendor_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplySettlementRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "purchaseBill.applyVendorAdvance",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = purchase_bill_service::apply_vendor_advance(
                tx,
                &ctx,
                id,
                body.source_id,
                body.clearing_account_id,
                body.date,
                body.amount,
            )
            .await
            .map_err(ApiError::from)?;
            Ok(SettlementResponse::from(outcome))
        },
    )
    .await?;

    Ok(Json(response))
}
