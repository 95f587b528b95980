//! `invoice.*` (spec §4.9, §6).

use crate::command::execute;
use crate::dto::{
    ApplyPaymentRequest, ApplySettlementRequest, DocumentLineRequest, DocumentResponse,
    EmptyRequest, SettlementResponse, VoidRequest,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use documents_rs::services::invoice_service;
use documents_rs::CreateInvoiceInput;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/invoices", post(create))
        .route("/api/v1/invoices/:id", put(update))
        .route("/api/v1/invoices/:id/approve", post(approve))
        .route("/api/v1/invoices/:id/post", post(post_invoice))
        .route("/api/v1/invoices/:id/adjust", post(adjust))
        .route("/api/v1/invoices/:id/void", post(void))
        .route("/api/v1/invoices/:id", delete(delete_invoice))
        .route("/api/v1/invoices/:id/apply-payment", post(apply_payment))
        .route(
            "/api/v1/invoices/:id/apply-customer-advance",
            post(apply_customer_advance),
        )
        .route(
            "/api/v1/invoices/:id/apply-credit-note",
            post(apply_credit_note),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateInvoiceRequest {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub ar_account_id: Uuid,
    pub tax_account_id: Option<Uuid>,
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    tag = "invoice",
    request_body = CreateInvoiceRequest,
    responses((status = 201, description = "invoice created", body = DocumentResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "invoice.create",
        None,
        &req,
        move |ctx, tx| async move {
            let header = invoice_service::create(
                tx,
                &ctx,
                CreateInvoiceInput {
                    date: body.date,
                    location_id: body.location_id,
                    currency: body.currency,
                    ar_account_id: body.ar_account_id,
                    tax_account_id: body.tax_account_id,
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

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateInvoiceRequest {
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = UpdateInvoiceRequest,
    responses((status = 200, description = "invoice content replaced", body = DocumentResponse))
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "invoice.update",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let lines = body.lines.into_iter().map(Into::into).collect();
            let header = invoice_service::update(tx, &ctx, id, lines)
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
    path = "/api/v1/invoices/{id}/approve",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "invoice approved", body = DocumentResponse))
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
        "invoice.approve",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = invoice_service::approve(tx, &ctx, id)
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
    path = "/api/v1/invoices/{id}/post",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "invoice posted to the ledger", body = DocumentResponse))
)]
pub(crate) async fn post_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (_, response) = execute(
        &state,
        &headers,
        "invoice.post",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = invoice_service::post(tx, &ctx, id)
                .await
                .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    Ok(Json(response))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdjustInvoiceRequest {
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/adjust",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = AdjustInvoiceRequest,
    responses((status = 200, description = "net-delta adjustment posted", body = DocumentResponse))
)]
pub(crate) async fn adjust(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustInvoiceRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "invoice.adjust",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let lines = body.lines.into_iter().map(Into::into).collect();
            let header = invoice_service::adjust(tx, &ctx, id, lines)
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
    path = "/api/v1/invoices/{id}/void",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = VoidRequest,
    responses((status = 200, description = "invoice voided", body = DocumentResponse))
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
        "invoice.void",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = invoice_service::void(tx, &ctx, id, body.reason)
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
    path = "/api/v1/invoices/{id}",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    responses((status = 204, description = "invoice deleted"))
)]
pub(crate) async fn delete_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<StatusCode, ApiError> {
    let (_, ()) = execute(
        &state,
        &headers,
        "invoice.delete",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            invoice_service::delete(tx, &ctx, id)
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
    path = "/api/v1/invoices/{id}/apply-payment",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplyPaymentRequest,
    responses((status = 200, description = "payment recorded against the invoice", body = SettlementResponse))
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
        "invoice.applyPayment",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = invoice_service::apply_payment(
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
    path = "/api/v1/invoices/{id}/apply-customer-advance",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplySettlementRequest,
    responses((status = 200, description = "customer advance applied to the invoice", body = SettlementResponse))
)]
pub(crate) async fn apply_customer_advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplySettlementRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "invoice.applyCustomerAdvance",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = invoice_service::apply_customer_advance(
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
    path = "/api/v1/invoices/{id}/apply-credit-note",
    tag = "invoice",
    params(
        ("id" = Uuid, Path, description = "invoice id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ApplySettlementRequest,
    responses((status = 200, description = "credit note applied to the invoice", body = SettlementResponse))
)]
pub(crate) async fn apply_credit_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplySettlementRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "invoice.applyCreditNote",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = invoice_service::apply_credit_note(
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
