//! Request/response DTOs shared across route modules, plus the header
//! plumbing (`X-Company-Id`, `Idempotency-Key`) every mutating command
//! needs. `Money`/`Rate` serialize as decimal strings (via
//! `rust_decimal`'s `serde-with-str` feature) so these shapes are the same
//! ones an external client would send.

use crate::error::ApiError;
use axum::http::HeaderMap;
use chrono::NaiveDate;
use documents_rs::{DocumentHeader, DocumentKind, DocumentStatus, SettlementOutcome};
use gl_rs::JournalEntry;
use money_rs::{Money, Rate};
use serde::{Deserialize, Serialize};
use tenant_context::{CompanyId, TenantContext};
use uuid::Uuid;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
pub const COMPANY_ID_HEADER: &str = "X-Company-Id";

/// Build a fresh `TenantContext` from the request's `X-Company-Id` header.
/// Actor identity and request authentication are the HTTP/auth framework's
/// concern (out of scope, spec §1) — this only establishes which tenant
/// the command is scoped to and mints a correlation id for the events this
/// request produces.
pub fn tenant_context_from_headers(headers: &HeaderMap) -> Result<TenantContext, ApiError> {
    let raw = headers
        .get(COMPANY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::invalid_input("X-Company-Id header is required"))?;
    let company_id = Uuid::parse_str(raw)
        .map_err(|_| ApiError::invalid_input("X-Company-Id must be a valid UUID"))?;
    Ok(TenantContext::new(CompanyId::new(company_id)))
}

pub fn idempotency_key_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or_else(ApiError::missing_idempotency_key)
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub kind: DocumentKind,
    pub number: String,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub total: Money,
    #[schema(value_type = String)]
    pub amount_settled: Money,
    #[schema(value_type = String)]
    pub remaining: Money,
    pub journal_entry_id: Option<Uuid>,
    pub void_journal_entry_id: Option<Uuid>,
}

impl From<DocumentHeader> for DocumentResponse {
    fn from(header: DocumentHeader) -> Self {
        Self {
            id: header.id,
            kind: header.kind,
            number: header.number.clone(),
            status: header.status,
            date: header.date,
            total: header.total_money(),
            amount_settled: header.amount_settled_money(),
            remaining: header.remaining(),
            journal_entry_id: header.journal_entry_id,
            void_journal_entry_id: header.void_journal_entry_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JournalEntryResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub reversal_of_journal_entry_id: Option<Uuid>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            description: entry.description,
            reversal_of_journal_entry_id: entry.reversal_of_journal_entry_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SettlementResponse {
    pub settlement_id: Uuid,
    pub journal_entry_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub remaining: Money,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
}

impl From<SettlementOutcome> for SettlementResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            settlement_id: outcome.settlement_id,
            journal_entry_id: outcome.journal_entry_id,
            remaining: outcome.remaining,
            status: outcome.status,
        }
    }
}

/// A document line as submitted over the wire; converted to
/// `documents_rs::DocumentLineInput` at the route boundary.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DocumentLineRequest {
    pub item_id: Option<Uuid>,
    pub account_id: Uuid,
    #[schema(value_type = String)]
    pub quantity: Rate,
    #[schema(value_type = String)]
    pub unit_amount: Money,
    #[serde(default)]
    #[schema(value_type = String)]
    pub discount_amount: Money,
    #[serde(default)]
    #[schema(value_type = String)]
    pub tax_rate: Rate,
    #[serde(default)]
    pub is_inventory_tracked: bool,
}

impl From<DocumentLineRequest> for documents_rs::DocumentLineInput {
    fn from(line: DocumentLineRequest) -> Self {
        documents_rs::DocumentLineInput {
            item_id: line.item_id,
            account_id: line.account_id,
            quantity: line.quantity,
            unit_amount: line.unit_amount,
            discount_amount: line.discount_amount,
            tax_rate: line.tax_rate,
            is_inventory_tracked: line.is_inventory_tracked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoidRequest {
    pub reason: String,
}

/// Body for commands that take no input of their own (`*.approve`,
/// `*.post`, `*.delete`) but still carry an `Idempotency-Key` header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmptyRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApplySettlementRequest {
    pub source_id: Uuid,
    pub clearing_account_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApplyPaymentRequest {
    pub bank_account_id: Uuid,
    pub clearing_account_id: Uuid,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub amount: Money,
}
