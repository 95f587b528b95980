//! `journalEntry.post` / `journalEntry.reverse` (spec §6). The thinnest
//! route module: no document state machine, just a direct pass-through to
//! `gl_rs`.

use crate::command::execute;
use crate::dto::JournalEntryResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use gl_rs::types::JournalLineInput;
use gl_rs::{create_reversal, post_journal_entry, CreateReversalInput, PostJournalEntryInput};
use money_rs::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/journal-entries", post(post_journal_entry_route))
        .route(
            "/api/v1/journal-entries/:id/reverse",
            post(reverse_journal_entry_route),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JournalLineRequest {
    pub account_id: Uuid,
    #[serde(default)]
    #[schema(value_type = String)]
    pub debit: Money,
    #[serde(default)]
    #[schema(value_type = String)]
    pub credit: Money,
}

impl From<JournalLineRequest> for JournalLineInput {
    fn from(line: JournalLineRequest) -> Self {
        JournalLineInput {
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PostJournalEntryRequest {
    pub date: NaiveDate,
    pub description: String,
    pub lines: Vec<JournalLineRequest>,
}

#[utoipa::path(
    post,
    path = "/api/v1/journal-entries",
    tag = "journal",
    request_body = PostJournalEntryRequest,
    responses((status = 201, description = "journal entry posted", body = JournalEntryResponse)),
    params(("Idempotency-Key" = String, Header, description = "client-generated idempotency key"))
)]
pub(crate) async fn post_journal_entry_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PostJournalEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntryResponse>), ApiError> {
    let body = req.clone();
    let (replayed, response) = execute(
        &state,
        &headers,
        "journalEntry.post",
        None,
        &req,
        move |ctx, tx| async move {
            let lines = body.lines.into_iter().map(JournalLineInput::from).collect();
            let entry = post_journal_entry(
                tx,
                &ctx,
                PostJournalEntryInput {
                    date: body.date,
                    description: &body.description,
                    lines,
                    reversal_of_journal_entry_id: None,
                    skip_account_validation: false,
                },
            )
            .await
            .map_err(ApiError::from)?;
            Ok(JournalEntryResponse::from(entry))
        },
    )
    .await?;

    let status = if replayed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(response)))
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReverseJournalEntryRequest {
    pub reversal_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub is_void: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/journal-entries/{id}/reverse",
    tag = "journal",
    params(
        ("id" = Uuid, Path, description = "journal entry id to reverse"),
        ("Idempotency-Key" = String, Header, description = "client-generated idempotency key"),
    ),
    request_body = ReverseJournalEntryRequest,
    responses((status = 200, description = "reversal entry posted", body = JournalEntryResponse))
)]
pub(crate) async fn reverse_journal_entry_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ReverseJournalEntryRequest>,
) -> Result<Json<JournalEntryResponse>, ApiError> {
    let body = req.clone();
    let (_, response) = execute(
        &state,
        &headers,
        "journalEntry.reverse",
        Some(format!("journal-entry:{id}")),
        &req,
        move |ctx, tx| async move {
            let outcome = create_reversal(
                tx,
                &ctx,
                CreateReversalInput {
                    original_id: id,
                    reversal_date: body.reversal_date,
                    reason: body.reason,
                    is_void: body.is_void,
                },
            )
            .await
            .map_err(ApiError::from)?;
            Ok(JournalEntryResponse::from(outcome.reversal))
        },
    )
    .await?;

    Ok(Json(response))
}
