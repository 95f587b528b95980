//! `vendorCredit.{create,post,void}` (spec §6).

use crate::command::execute;
use crate::dto::{DocumentLineRequest, DocumentResponse, EmptyRequest, VoidRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use documents_rs::services::vendor_credit_service;
use documents_rs::CreateVendorCreditInput;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/vendor-credits", post(create))
        .route("/api/v1/vendor-credits/:id/post", post(post_credit))
        .route("/api/v1/vendor-credits/:id/void", post(void))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateVendorCreditRequest {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub clearing_account_id: Uuid,
    pub lines: Vec<DocumentLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/vendor-credits",
    tag = "vendor-credit",
    request_body = CreateVendorCreditRequest,
    responses((status = 201, description = "vendor credit created", body = DocumentResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateVendorCreditRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "vendorCredit.create",
        None,
        &req,
        move |ctx, tx| async move {
            let header = vendor_credit_service::create(
                tx,
                &ctx,
                CreateVendorCreditInput {
                    date: body.date,
                    location_id: body.location_id,
                    currency: body.currency,
                    clearing_account_id: body.clearing_account_id,
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
    path = "/api/v1/vendor-credits/{id}/post",
    tag = "vendor-credit",
    params(
        ("id" = Uuid, Path, description = "vendor credit id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = EmptyRequest,
    responses((status = 200, description = "vendor credit posted to the ledger", body = DocumentResponse))
)]
pub(crate) async fn post_credit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmptyRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (_, response) = execute(
        &state,
        &headers,
        "vendorCredit.post",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = vendor_credit_service::post(tx, &ctx, id)
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
    path = "/api/v1/vendor-credits/{id}/void",
    tag = "vendor-credit",
    params(
        ("id" = Uuid, Path, description = "vendor credit id"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = VoidRequest,
    responses((status = 200, description = "vendor credit voided", body = DocumentResponse))
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
        "vendorCredit.void",
        Some(format!("document:{id}")),
        &req,
        move |ctx, tx| async move {
            let header = vendor_credit_service::void(tx, &ctx, id, body.reason)
                .await
                .map_err(ApiError::from)?;
            Ok(DocumentResponse::from(header))
        },
    )
    .await?;

    Ok(Json(response))
}
