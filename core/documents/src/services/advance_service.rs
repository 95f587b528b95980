//! Customer and vendor advances (spec §6 `customerAdvance.*` /
//! `vendorAdvance.*`). Both are single-line cash-against-clearing postings
//! rather than line-item documents — a customer advance books the deposit
//! as a liability until it is applied to an invoice; a vendor advance books
//! it as a prepaid asset until applied to a purchase bill. Applying either
//! is handled entirely by `settlement_service::apply_advance`, invoked via
//! `invoice_service::apply_customer_advance` / `purchase_bill_service::apply_vendor_advance`.

use crate::errors::DocumentError;
use crate::repos::document_repo;
use crate::services::state_machine::{check_transition, DocumentEvent};
use crate::types::{Company, DocumentHeader, DocumentKind, DocumentStatus};
use chrono::NaiveDate;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::services::reversal_service::{create_reversal, CreateReversalInput};
use gl_rs::types::JournalLineInput;
use money_rs::Money;
use numbering::DocumentKind as NumberingKind;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

pub struct CreateCustomerAdvanceInput {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub bank_account_id: Uuid,
    pub clearing_account_id: Uuid,
    pub amount: Money,
}

pub struct CreateVendorAdvanceInput {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub bank_account_id: Uuid,
    pub amount: Money,
}

/// `customerAdvance.create`. The deposit sits in `clearing_account_id` (a
/// customer-deposits liability account supplied by the caller) until it is
/// later applied to an invoice.
pub async fn create_customer_advance(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: CreateCustomerAdvanceInput,
) -> Result<DocumentHeader, DocumentError> {
    if !input.amount.is_positive() {
        return Err(DocumentError::InvalidInput(
            "advance amount must be positive".to_string(),
        ));
    }
    let number = numbering::next(tx, ctx.company_id, NumberingKind::CustomerAdvance).await?;

    document_repo::insert(
        tx,
        document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            kind: DocumentKind::CustomerAdvance,
            number,
            date: input.date,
            total: input.amount,
            location_id: input.location_id,
            currency: input.currency,
            linked_receipt_id: None,
            bank_account_id: Some(input.bank_account_id),
            clearing_account_id: Some(input.clearing_account_id),
            tax_account_id: None,
        },
    )
    .await
    .map_err(DocumentError::from)
}

/// `vendorAdvance.create`. The prepayment always lands in the company's
/// `default_vendor_prepayment_account_id`, which doubles as this
/// document's `clearing_account_id` — that is what lets
/// `settlement_service::apply_source`'s generic bill branch (`Dr AP / Cr
/// clearing`) apply it without any vendor-advance-specific code.
pub async fn create_vendor_advance(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    company: &Company,
    input: CreateVendorAdvanceInput,
) -> Result<DocumentHeader, DocumentError> {
    if !input.amount.is_positive() {
        return Err(DocumentError::InvalidInput(
            "advance amount must be positive".to_string(),
        ));
    }
    let number = numbering::next(tx, ctx.company_id, NumberingKind::VendorAdvance).await?;

    document_repo::insert(
        tx,
        document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            kind: DocumentKind::VendorAdvance,
            number,
            date: input.date,
            total: input.amount,
            location_id: input.location_id,
            currency: input.currency,
            linked_receipt_id: None,
            bank_account_id: Some(input.bank_account_id),
            clearing_account_id: Some(company.default_vendor_prepayment_account_id),
            tax_account_id: None,
        },
    )
    .await
    .map_err(DocumentError::from)
}

/// `customerAdvance.post` / `vendorAdvance.post`: a single two-line entry
/// against the document's own `bank_account_id` and `clearing_account_id`.
/// Customer advance: `Dr bank / Cr clearing` (cash received, deposit
/// booked). Vendor advance: `Dr clearing / Cr bank` (prepayment booked,
/// cash paid out).
pub async fn post(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    advance_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, advance_id).await?;
    check_transition(&header, DocumentEvent::Post)?;

    let bank_account_id = header.bank_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("advance {advance_id} has no bank account"))
    })?;
    let clearing_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("advance {advance_id} has no clearing account"))
    })?;

    let lines = match header.kind {
        DocumentKind::CustomerAdvance => vec![
            JournalLineInput::debit(bank_account_id, header.total_money()),
            JournalLineInput::credit(clearing_account_id, header.total_money()),
        ],
        DocumentKind::VendorAdvance => vec![
            JournalLineInput::debit(clearing_account_id, header.total_money()),
            JournalLineInput::credit(bank_account_id, header.total_money()),
        ],
        _ => {
            return Err(DocumentError::InvalidInput(format!(
                "document {advance_id} is not an advance"
            )))
        }
    };

    let description = match header.kind {
        DocumentKind::CustomerAdvance => format!("Customer advance {} received", header.number),
        _ => format!("Vendor advance {} paid", header.number),
    };

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &description,
            lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    document_repo::mark_posted(tx, advance_id, DocumentStatus::Posted, entry.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, advance_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {advance_id}")))
}

/// `customerAdvance.void` / `vendorAdvance.void`. Rejects voiding once any
/// portion has already been applied to a document, same as vendor credits.
pub async fn void(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    advance_id: Uuid,
    reason: String,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, advance_id).await?;
    check_transition(&header, DocumentEvent::Void)?;

    let applied = crate::repos::settlement_repo::total_applied_from_source(
        tx,
        ctx.company_id.0,
        advance_id,
    )
    .await?;
    if applied.is_positive() {
        return Err(DocumentError::InvalidStateTransition(format!(
            "advance {advance_id} has already been applied and cannot be voided"
        )));
    }

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "advance {advance_id} has no posted journal entry to void"
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

    document_repo::mark_void(tx, advance_id, reversal.reversal.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, advance_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {advance_id}")))
}

pub async fn delete(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    advance_id: Uuid,
) -> Result<(), DocumentError> {
    let header = lock(tx, ctx, advance_id).await?;
    if !header.is_deletable() {
        return Err(DocumentError::InvalidStateTransition(format!(
            "advance {advance_id} cannot be deleted in its current state"
        )));
    }
    document_repo::delete(tx, advance_id).await?;
    Ok(())
}

async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    advance_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = document_repo::lock_by_id(tx, ctx.company_id.0, advance_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {advance_id}")))?;
    assert_same_tenant(ctx, &header)?;
    if !matches!(header.kind, DocumentKind::CustomerAdvance | DocumentKind::VendorAdvance) {
        return Err(DocumentError::InvalidInput(format!(
            "document {advance_id} is not an advance"
        )));
    }
    Ok(header)
}
