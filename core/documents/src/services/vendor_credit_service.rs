//! Vendor credit note (spec §6 `vendorCredit.{create, post, void}`). A
//! credit note books its lines against a `clearing_account_id` rather than
//! directly against Accounts Payable, since the credit has not yet been
//! matched to a specific bill — `purchase_bill_service::apply_vendor_credit`
//! is what eventually moves that clearing balance onto AP (see
//! `settlement_service::apply_credit`).

use crate::errors::DocumentError;
use crate::repos::{document_line_repo, document_repo};
use crate::services::line_calc::{compute_document_total, compute_line};
use crate::services::state_machine::{check_transition, DocumentEvent};
use crate::types::{ComputedLine, DocumentHeader, DocumentKind, DocumentLineInput, DocumentStatus};
use chrono::NaiveDate;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::services::reversal_service::{create_reversal, CreateReversalInput};
use gl_rs::types::JournalLineInput;
use numbering::DocumentKind as NumberingKind;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

pub struct CreateVendorCreditInput {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub clearing_account_id: Uuid,
    pub lines: Vec<DocumentLineInput>,
}

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: CreateVendorCreditInput,
) -> Result<DocumentHeader, DocumentError> {
    let computed = compute_lines(input.lines)?;
    let total = compute_document_total(&computed);

    let number = numbering::next(tx, ctx.company_id, NumberingKind::VendorCredit).await?;

    let header = document_repo::insert(
        tx,
        document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            kind: DocumentKind::VendorCredit,
            number,
            date: input.date,
            total,
            location_id: input.location_id,
            currency: input.currency,
            linked_receipt_id: None,
            bank_account_id: None,
            clearing_account_id: Some(input.clearing_account_id),
            tax_account_id: None,
        },
    )
    .await?;

    document_line_repo::replace_lines(tx, ctx.company_id.0, header.id, &computed).await?;

    Ok(header)
}

/// `vendorCredit.post`: `Dr clearing_account_id total`, `Cr <line account>
/// lineTotal` per line — the inverse of how those lines were originally
/// billed.
pub async fn post(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    credit_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, credit_id).await?;
    check_transition(&header, DocumentEvent::Post)?;

    let clearing_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("vendor credit {credit_id} has no clearing account"))
    })?;

    let lines = document_line_repo::fetch_for_document(tx, credit_id).await?;
    let mut journal_lines = vec![JournalLineInput::debit(clearing_account_id, header.total_money())];
    for line in &lines {
        journal_lines.push(JournalLineInput::credit(
            line.account_id,
            money_rs::Money::from_decimal(line.line_total),
        ));
    }

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &format!("Vendor credit {} posted", header.number),
            lines: journal_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    document_repo::mark_posted(tx, credit_id, DocumentStatus::Posted, entry.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, credit_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {credit_id}")))
}

/// `vendorCredit.void`. Rejects voiding a credit that has already been
/// partially or fully applied — `amount_settled` tracks the portion drawn
/// onto bills via `settlement_service::apply_credit`'s `source_id` link.
pub async fn void(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    credit_id: Uuid,
    reason: String,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, credit_id).await?;
    check_transition(&header, DocumentEvent::Void)?;

    let applied = crate::repos::settlement_repo::total_applied_from_source(
        tx,
        ctx.company_id.0,
        credit_id,
    )
    .await?;
    if applied.is_positive() {
        return Err(DocumentError::InvalidStateTransition(format!(
            "vendor credit {credit_id} has already been applied and cannot be voided"
        )));
    }

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "vendor credit {credit_id} has no posted journal entry to void"
        ))
    })?;

    let reversal = create_reversal(
        tx,
        ctx,
        CreateReversalInput {
            original_id: journal_entry_id,
            reversal_date: header.date,
            reason,
            is_void: true,
        },
    )
    .await?;

    document_repo::mark_void(tx, credit_id, reversal.reversal.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, credit_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {credit_id}")))
}

async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    credit_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = document_repo::lock_by_id(tx, ctx.company_id.0, credit_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {credit_id}")))?;
    assert_same_tenant(ctx, &header)?;
    if header.kind != DocumentKind::VendorCredit {
        return Err(DocumentError::InvalidInput(format!(
            "document {credit_id} is not a vendor credit"
        )));
    }
    Ok(header)
}

fn compute_lines(inputs: Vec<DocumentLineInput>) -> Result<Vec<ComputedLine>, DocumentError> {
    if inputs.is_empty() {
        return Err(DocumentError::InvalidInput(
            "a vendor credit needs at least one line".to_string(),
        ));
    }
    inputs.into_iter().map(compute_line).collect()
}
