//! `period.close` (spec §4.2, §6).

use crate::command::execute;
use crate::dto::JournalEntryResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use gl_rs::close_period;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/periods/close", post(close))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClosePeriodRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub equity_account_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/v1/periods/close",
    tag = "period",
    request_body = ClosePeriodRequest,
    responses((status = 200, description = "period closed, net income/expense transferred to equity", body = JournalEntryResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn close(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClosePeriodRequest>,
) -> Result<Json<JournalEntryResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "period.close",
        Some(format!("period-close:{}", body.to)),
        &req,
        move |ctx, tx| async move {
            let entry = close_period(tx, &ctx, body.from, body.to, body.equity_account_id)
                .await
                .map_err(ApiError::from)?;
            Ok(JournalEntryResponse::from(entry))
        },
    )
    .await?;

    Ok(Json(response))
}
