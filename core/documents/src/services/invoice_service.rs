//! Invoice state machine (spec §4.9, §6 `invoice.*`). Posting books `Dr AR
//! total`, `Cr <line account> lineTotal` per line, and a single `Cr
//! taxAccountId Σtax` line when any tax was charged — matching scenario 1's
//! `Dr AR 220, Cr Sales Income 200, Cr Tax Payable 20`.

use crate::errors::DocumentError;
use crate::repos::{document_line_repo, document_repo};
use crate::services::line_calc::{compute_document_total, compute_line};
use crate::services::state_machine::{check_transition, DocumentEvent};
use crate::types::{ComputedLine, DocumentHeader, DocumentKind, DocumentLineInput, DocumentStatus};
use chrono::NaiveDate;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::types::JournalLineInput;
use gl_rs::services::reversal_service::{create_reversal, CreateReversalInput};
use money_rs::Money;
use numbering::DocumentKind as NumberingKind;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

pub struct CreateInvoiceInput {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub ar_account_id: Uuid,
    pub tax_account_id: Option<Uuid>,
    pub lines: Vec<DocumentLineInput>,
}

/// `invoice.create`. Computes and validates every line, totals the
/// document, allocates the invoice number, and persists a `DRAFT` document.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: CreateInvoiceInput,
) -> Result<DocumentHeader, DocumentError> {
    let computed = compute_lines(input.lines)?;
    let total = compute_document_total(&computed);

    let number = numbering::next(tx, ctx.company_id, NumberingKind::Invoice).await?;

    let header = document_repo::insert(
        tx,
        document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            kind: DocumentKind::Invoice,
            number,
            date: input.date,
            total,
            location_id: input.location_id,
            currency: input.currency,
            linked_receipt_id: None,
            bank_account_id: None,
            clearing_account_id: Some(input.ar_account_id),
            tax_account_id: input.tax_account_id,
        },
    )
    .await?;

    document_line_repo::replace_lines(tx, ctx.company_id.0, header.id, &computed).await?;

    Ok(header)
}

/// `invoice.update`: only legal while `isEditable()`; replaces the line
/// set and recomputes the stored total.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    lines: Vec<DocumentLineInput>,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    check_transition(&header, DocumentEvent::EditContent)?;

    let computed = compute_lines(lines)?;
    let total = compute_document_total(&computed);

    document_line_repo::replace_lines(tx, ctx.company_id.0, invoice_id, &computed).await?;
    document_repo::set_total(tx, invoice_id, total).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, invoice_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {invoice_id}")))
}

pub async fn approve(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    let next = check_transition(&header, DocumentEvent::Approve)?;
    document_repo::set_status(tx, invoice_id, next).await?;
    Ok(header)
}

/// `invoice.post`. Validates the invoice against its own AR account type
/// the way `post_journal_entry` validates every line, then books the
/// scenario-1 entry.
pub async fn post(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    check_transition(&header, DocumentEvent::Post)?;

    let ar_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("invoice {invoice_id} has no AR account recorded"))
    })?;

    let lines = document_line_repo::fetch_for_document(tx, invoice_id).await?;
    let mut journal_lines = vec![JournalLineInput::debit(ar_account_id, header.total_money())];

    let mut tax_total = Money::ZERO;
    for line in &lines {
        let line_total = Money::from_decimal(line.line_total);
        journal_lines.push(JournalLineInput::credit(line.account_id, line_total));
        tax_total += Money::from_decimal(line.tax_amount);
    }

    if tax_total.is_positive() {
        let tax_account_id = header.tax_account_id.ok_or_else(|| {
            DocumentError::InvalidInput(format!(
                "invoice {invoice_id} charges tax but has no tax account recorded"
            ))
        })?;
        journal_lines.push(JournalLineInput::credit(tax_account_id, tax_total));
    }

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &format!("Invoice {} posted", header.number),
            lines: journal_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    document_repo::mark_posted(tx, invoice_id, DocumentStatus::Posted, entry.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, invoice_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {invoice_id}")))
}

/// `invoice.adjust` (spec §4.4.2): content is already replaced via
/// `update`-style editing before this call; this books the net-delta entry
/// between the previously posted lines and the recomputed current lines.
pub async fn adjust(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    new_lines: Vec<DocumentLineInput>,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    check_transition(&header, DocumentEvent::Adjust)?;

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "invoice {invoice_id} has no posted journal entry to adjust"
        ))
    })?;

    let ar_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("invoice {invoice_id} has no AR account recorded"))
    })?;

    if let Some(prior_adjustment_id) = header.last_adjustment_journal_entry_id {
        create_reversal(
            tx,
            ctx,
            CreateReversalInput {
                original_id: prior_adjustment_id,
                reversal_date: header.date,
                reason: "superseded by a new adjustment".to_string(),
                is_void: false,
            },
        )
        .await?;
    }

    let computed = compute_lines(new_lines)?;
    let new_total = compute_document_total(&computed);

    let mut desired_net: std::collections::HashMap<Uuid, Money> = std::collections::HashMap::new();
    *desired_net.entry(ar_account_id).or_insert(Money::ZERO) += new_total;
    let mut tax_total = Money::ZERO;
    for line in &computed {
        *desired_net.entry(line.input.account_id).or_insert(Money::ZERO) -= line.line_total;
        tax_total += line.tax_amount;
    }
    if tax_total.is_positive() {
        let tax_account_id = header.tax_account_id.ok_or_else(|| {
            DocumentError::InvalidInput(format!(
                "invoice {invoice_id} charges tax but has no tax account recorded"
            ))
        })?;
        *desired_net.entry(tax_account_id).or_insert(Money::ZERO) -= tax_total;
    }

    let (_, existing_lines) =
        gl_rs::repos::journal_repo::fetch_entry_with_lines(tx, ctx.company_id.0, journal_entry_id)
            .await?
            .ok_or_else(|| DocumentError::NotFound(format!("journal entry {journal_entry_id}")))?;
    let delta_lines = gl_rs::compute_net_delta_lines(&existing_lines, &desired_net);

    let adjustment = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &format!("Invoice {} adjusted", header.number),
            lines: delta_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    document_line_repo::replace_lines(tx, ctx.company_id.0, invoice_id, &computed).await?;
    document_repo::set_total(tx, invoice_id, new_total).await?;
    document_repo::set_last_adjustment(tx, invoice_id, adjustment.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, invoice_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {invoice_id}")))
}

/// `invoice.void` (spec §4.4.5): reverses any prior adjustment, then the
/// main entry, and marks the document `VOID`.
pub async fn void(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    reason: String,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    check_transition(&header, DocumentEvent::Void)?;

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "invoice {invoice_id} has no posted journal entry to void"
        ))
    })?;

    if let Some(prior_adjustment_id) = header.last_adjustment_journal_entry_id {
        create_reversal(
            tx,
            ctx,
            CreateReversalInput {
                original_id: prior_adjustment_id,
                reversal_date: header.date,
                reason: reason.clone(),
                is_void: true,
            },
        )
        .await?;
    }

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

    document_repo::mark_void(tx, invoice_id, reversal.reversal.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, invoice_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {invoice_id}")))
}

/// `invoice.delete`: only while draft/approved with no settlements or JE.
pub async fn delete(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
) -> Result<(), DocumentError> {
    let header = lock(tx, ctx, invoice_id).await?;
    check_transition(&header, DocumentEvent::Delete)?;
    document_repo::delete(tx, invoice_id).await?;
    Ok(())
}

/// `invoice.applyPayment`.
pub async fn apply_payment(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    bank_account_id: Uuid,
    ar_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::record_payment(
        tx,
        ctx,
        invoice_id,
        bank_account_id,
        crate::services::settlement_service::PaymentDirection::CustomerPayment { ar_account_id },
        date,
        amount,
    )
    .await
}

/// `invoice.applyCustomerAdvance`.
pub async fn apply_customer_advance(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    advance_id: Uuid,
    ar_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::apply_advance(
        tx,
        ctx,
        invoice_id,
        advance_id,
        ar_account_id,
        date,
        amount,
    )
    .await
}

/// `invoice.applyCreditNote`.
pub async fn apply_credit_note(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
    credit_note_id: Uuid,
    ar_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::apply_credit(
        tx,
        ctx,
        invoice_id,
        credit_note_id,
        ar_account_id,
        date,
        amount,
    )
    .await
}

async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    invoice_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = document_repo::lock_by_id(tx, ctx.company_id.0, invoice_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {invoice_id}")))?;
    assert_same_tenant(ctx, &header)?;
    if header.kind != DocumentKind::Invoice {
        return Err(DocumentError::InvalidInput(format!(
            "document {invoice_id} is not an invoice"
        )));
    }
    Ok(header)
}

fn compute_lines(inputs: Vec<DocumentLineInput>) -> Result<Vec<ComputedLine>, DocumentError> {
    if inputs.is_empty() {
        return Err(DocumentError::InvalidInput(
            "an invoice needs at least one line".to_string(),
        ));
    }
    inputs.into_iter().map(compute_line).collect()
}
