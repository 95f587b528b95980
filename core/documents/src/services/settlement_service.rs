//! The shared settlement template (spec §4.8): record a payment, apply a
//! credit note, or apply an advance against a document. All three follow
//! the same steps — lock the document row, recompute `remaining`,
//! validate the amount, post a journal entry, insert the settlement row,
//! and transition status — differing only in which accounts the journal
//! entry touches and (for credit/advance applications) which source
//! document supplies the amount.

use crate::errors::DocumentError;
use crate::repos::{bank_account_repo, company_repo, document_repo, settlement_repo};
use crate::types::{BankAccountKind, DocumentHeader, DocumentKind, DocumentStatus, SettlementKind};
use chrono::NaiveDate;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::types::JournalLineInput;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

/// Which side of the settlement debits and which credits, and with what
/// description prefix. `record_payment` (cash) always uses
/// `PaymentDirection`; credit/advance applications build their own two
/// accounts directly since there is no bank account involved.
pub enum PaymentDirection {
    /// Customer payment against an invoice: Dr bank, Cr AR.
    CustomerPayment { ar_account_id: Uuid },
    /// Vendor payment against a purchase bill: Dr AP, Cr bank.
    VendorPayment { ap_account_id: Uuid },
}

pub struct SettlementOutcome {
    pub settlement_id: Uuid,
    pub journal_entry_id: Option<Uuid>,
    pub remaining: Money,
    pub status: DocumentStatus,
}

/// `0 < amount ≤ remaining(document)`, checked under the document's row
/// lock so two concurrent settlements against the same document can never
/// both succeed past the remaining balance (spec §5 "document totals and
/// `amountPaid` are mutated only while holding the document row lock").
async fn remaining_under_lock(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    document_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = document_repo::lock_by_id(tx, ctx.company_id.0, document_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {document_id}")))?;
    assert_same_tenant(ctx, &header)?;
    Ok(header)
}

/// `header.currency`, if set, must match the company's base currency at
/// payment time (spec §7 `currency-mismatch`). A document with no currency
/// recorded is assumed to already be in the base currency.
async fn assert_currency_matches_base(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    header: &DocumentHeader,
) -> Result<(), DocumentError> {
    let Some(document_currency) = &header.currency else {
        return Ok(());
    };
    let company = company_repo::find_by_id(tx, ctx.company_id.0)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("company {}", ctx.company_id.0)))?;
    if *document_currency != company.base_currency {
        return Err(DocumentError::CurrencyMismatch {
            document: document_currency.clone(),
            base: company.base_currency,
        });
    }
    Ok(())
}

fn validate_amount(
    document_id: Uuid,
    amount: Money,
    remaining: Money,
) -> Result<(), DocumentError> {
    if !amount.is_positive() {
        return Err(DocumentError::InvalidInput(
            "settlement amount must be positive".to_string(),
        ));
    }
    if amount > remaining {
        return Err(DocumentError::Overpayment {
            document_id,
            amount,
            remaining,
        });
    }
    Ok(())
}

async fn finish_settlement(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    header: &DocumentHeader,
    kind: SettlementKind,
    source_id: Option<Uuid>,
    date: NaiveDate,
    amount: Money,
    journal_entry_id: Option<Uuid>,
) -> Result<SettlementOutcome, DocumentError> {
    let settlement = settlement_repo::insert(
        tx,
        settlement_repo::NewSettlement {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            document_id: header.id,
            source_id,
            kind,
            date,
            amount,
            journal_entry_id,
        },
    )
    .await?;

    let total_settled = settlement_repo::total_settled(tx, ctx.company_id.0, header.id).await?;
    let remaining = header.total_money() - total_settled;
    let status = crate::services::state_machine::status_after_settlement(remaining);

    document_repo::set_amount_settled(tx, header.id, total_settled).await?;
    document_repo::set_status(tx, header.id, status).await?;

    Ok(SettlementOutcome {
        settlement_id: settlement.id,
        journal_entry_id,
        remaining,
        status,
    })
}

/// `invoice.applyPayment` / `purchaseBill.applyPayment` (spec §4.4.4).
pub async fn record_payment(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    document_id: Uuid,
    bank_account_id: Uuid,
    direction: PaymentDirection,
    date: NaiveDate,
    amount: Money,
) -> Result<SettlementOutcome, DocumentError> {
    let header = remaining_under_lock(tx, ctx, document_id).await?;
    if !matches!(header.status, DocumentStatus::Posted | DocumentStatus::Partial) {
        return Err(DocumentError::InvalidStateTransition(format!(
            "document {document_id} is not in a payable state ({:?})",
            header.status
        )));
    }
    assert_currency_matches_base(tx, ctx, &header).await?;

    let total_settled = settlement_repo::total_settled(tx, ctx.company_id.0, document_id).await?;
    let remaining = header.total_money() - total_settled;
    validate_amount(document_id, amount, remaining)?;

    let bank_account = bank_account_repo::find_by_id(tx, ctx.company_id.0, bank_account_id)
        .await?
        .ok_or_else(|| DocumentError::InvalidInput(format!(
            "{bank_account_id} is not a registered banking account"
        )))?;
    if !bank_account.is_active {
        return Err(DocumentError::InvalidInput(format!(
            "banking account {bank_account_id} is not active"
        )));
    }
    if matches!(direction, PaymentDirection::VendorPayment { .. })
        && bank_account.kind == BankAccountKind::CreditCard
    {
        return Err(DocumentError::CreditCardCannotPayVendor(bank_account_id));
    }

    let description = match header.kind {
        DocumentKind::Invoice => format!("Payment received for {}", header.number),
        _ => format!("Payment made against {}", header.number),
    };

    let lines = match direction {
        PaymentDirection::CustomerPayment { ar_account_id } => vec![
            JournalLineInput::debit(bank_account.ledger_account_id, amount),
            JournalLineInput::credit(ar_account_id, amount),
        ],
        PaymentDirection::VendorPayment { ap_account_id } => vec![
            JournalLineInput::debit(ap_account_id, amount),
            JournalLineInput::credit(bank_account.ledger_account_id, amount),
        ],
    };

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date,
            description: &description,
            lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    finish_settlement(
        tx,
        ctx,
        &header,
        SettlementKind::Payment,
        None,
        date,
        amount,
        Some(entry.id),
    )
    .await
}

/// `invoice.applyCreditNote` / `purchaseBill.applyVendorCredit`. The
/// credit note itself already posted a balanced entry into its own
/// `clearing_account_id` when it was posted (see `vendor_credit_service`);
/// applying it here moves that clearing balance onto the target
/// document's AP/AR account.
pub async fn apply_credit(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    document_id: Uuid,
    credit_note_id: Uuid,
    target_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<SettlementOutcome, DocumentError> {
    apply_source(
        tx,
        ctx,
        document_id,
        credit_note_id,
        target_account_id,
        date,
        amount,
        SettlementKind::CreditApplication,
        "Vendor credit applied",
    )
    .await
}

/// `invoice.applyCustomerAdvance` / `purchaseBill.applyVendorAdvance`.
pub async fn apply_advance(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    document_id: Uuid,
    advance_id: Uuid,
    target_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<SettlementOutcome, DocumentError> {
    apply_source(
        tx,
        ctx,
        document_id,
        advance_id,
        target_account_id,
        date,
        amount,
        SettlementKind::AdvanceApplication,
        "Advance applied",
    )
    .await
}

/// For a customer-facing document (invoice), `target_account_id` debits
/// from (AR goes down — actually credited) ... the caller passes the
/// correct account for its side; this helper only enforces the shared
/// remaining/amount checks and posts `Dr clearing / Cr target` for
/// invoices or `Dr target / Cr clearing` for bills, decided by the
/// document kind.
#[allow(clippy::too_many_arguments)]
async fn apply_source(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    document_id: Uuid,
    source_id: Uuid,
    target_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
    kind: SettlementKind,
    description: &str,
) -> Result<SettlementOutcome, DocumentError> {
    let header = remaining_under_lock(tx, ctx, document_id).await?;
    if !matches!(header.status, DocumentStatus::Posted | DocumentStatus::Partial) {
        return Err(DocumentError::InvalidStateTransition(format!(
            "document {document_id} is not in a settleable state ({:?})",
            header.status
        )));
    }

    let source = document_repo::lock_by_id(tx, ctx.company_id.0, source_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {source_id}")))?;
    assert_same_tenant(ctx, &source)?;

    let clearing_account_id = source.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!(
            "document {source_id} has no clearing account to apply from"
        ))
    })?;

    let total_settled = settlement_repo::total_settled(tx, ctx.company_id.0, document_id).await?;
    let remaining = header.total_money() - total_settled;
    validate_amount(document_id, amount, remaining)?;

    let already_applied =
        settlement_repo::total_applied_from_source(tx, ctx.company_id.0, source_id).await?;
    let source_remaining = source.total_money() - already_applied;
    if amount > source_remaining {
        return Err(DocumentError::Overpayment {
            document_id: source_id,
            amount,
            remaining: source_remaining,
        });
    }

    // Invoices/customer advances reduce AR by crediting it; bills/vendor
    // credits reduce AP by debiting it. The clearing account takes the
    // opposite side in each case so the entry balances.
    let lines = match header.kind {
        DocumentKind::Invoice => vec![
            JournalLineInput::debit(clearing_account_id, amount),
            JournalLineInput::credit(target_account_id, amount),
        ],
        _ => vec![
            JournalLineInput::debit(target_account_id, amount),
            JournalLineInput::credit(clearing_account_id, amount),
        ],
    };

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date,
            description: &format!("{description} to {}", header.number),
            lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    finish_settlement(
        tx,
        ctx,
        &header,
        kind,
        Some(source_id),
        date,
        amount,
        Some(entry.id),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_amount_rejects_zero_and_negative() {
        let doc = Uuid::new_v4();
        assert!(validate_amount(doc, Money::ZERO, Money::parse("10.00").unwrap()).is_err());
        assert!(validate_amount(doc, Money::parse("-1.00").unwrap(), Money::parse("10.00").unwrap())
            .is_err());
    }

    #[test]
    fn validate_amount_rejects_overpayment() {
        let doc = Uuid::new_v4();
        let result = validate_amount(
            doc,
            Money::parse("150.00").unwrap(),
            Money::parse("100.00").unwrap(),
        );
        assert!(matches!(result, Err(DocumentError::Overpayment { .. })));
    }

    #[test]
    fn validate_amount_accepts_exact_remaining() {
        let doc = Uuid::new_v4();
        assert!(validate_amount(
            doc,
            Money::parse("100.00").unwrap(),
            Money::parse("100.00").unwrap()
        )
        .is_ok());
    }
}
