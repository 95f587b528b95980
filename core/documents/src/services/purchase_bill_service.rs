//! Purchase bill state machine (spec §4.4.3, §4.9, §6 `purchaseBill.*`).
//! Posting takes one of two paths: a stand-alone bill applies stock moves
//! directly off its own lines, while a bill linked to a `PurchaseReceipt`
//! books GRNI/PPV against the receipt that already moved the stock.

use crate::errors::DocumentError;
use crate::repos::{company_repo, document_line_repo, document_repo, landed_cost_repo};
use crate::services::line_calc::{compute_document_total, compute_line};
use crate::services::state_machine::{check_transition, DocumentEvent};
use crate::types::{ComputedLine, DocumentHeader, DocumentKind, DocumentLineInput, DocumentStatus};
use chrono::NaiveDate;
use gl_rs::repos::account_repo;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::services::reversal_service::{create_reversal, CreateReversalInput};
use gl_rs::types::{AccountType, JournalLineInput};
use inventory_rs::services::wac_engine::{apply_stock_move_wac, apply_stock_value_adjustment_wac};
use inventory_rs::types::{Direction, StockMoveInput, StockMoveKind};
use money_rs::{Money, Rate};
use numbering::DocumentKind as NumberingKind;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

pub struct CreatePurchaseBillInput {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub ap_account_id: Uuid,
    pub linked_receipt_id: Option<Uuid>,
    pub lines: Vec<DocumentLineInput>,
}

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: CreatePurchaseBillInput,
) -> Result<DocumentHeader, DocumentError> {
    let computed = compute_lines(input.lines)?;
    let total = compute_document_total(&computed);

    let number = numbering::next(tx, ctx.company_id, NumberingKind::PurchaseBill).await?;

    let header = document_repo::insert(
        tx,
        document_repo::NewDocument {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            kind: DocumentKind::PurchaseBill,
            number,
            date: input.date,
            total,
            location_id: input.location_id,
            currency: input.currency,
            linked_receipt_id: input.linked_receipt_id,
            bank_account_id: None,
            clearing_account_id: Some(input.ap_account_id),
            tax_account_id: None,
        },
    )
    .await?;

    document_line_repo::replace_lines(tx, ctx.company_id.0, header.id, &computed).await?;

    Ok(header)
}

pub async fn approve(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, bill_id).await?;
    let next = check_transition(&header, DocumentEvent::Approve)?;
    document_repo::set_status(tx, bill_id, next).await?;
    Ok(header)
}

/// `purchaseBill.post`. Dispatches to the stand-alone or linked-receipt
/// path depending on `linked_receipt_id`.
pub async fn post(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, bill_id).await?;
    check_transition(&header, DocumentEvent::Post)?;

    let ap_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("bill {bill_id} has no AP account recorded"))
    })?;

    let lines = document_line_repo::fetch_for_document(tx, bill_id).await?;

    let entry_id = match header.linked_receipt_id {
        None => post_standalone(tx, ctx, &header, ap_account_id, &lines).await?,
        Some(receipt_id) => post_with_linked_receipt(tx, ctx, &header, ap_account_id, receipt_id).await?,
    };

    document_repo::mark_posted(tx, bill_id, DocumentStatus::Posted, entry_id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, bill_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {bill_id}")))
}

async fn post_standalone(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    header: &DocumentHeader,
    ap_account_id: Uuid,
    lines: &[crate::types::DocumentLineRow],
) -> Result<Uuid, DocumentError> {
    let mut journal_lines = Vec::with_capacity(lines.len() + 1);

    for line in lines {
        let line_total = Money::from_decimal(line.line_total);
        if line.is_inventory_tracked {
            let item_id = line.item_id.ok_or_else(|| {
                DocumentError::InvalidInput(format!(
                    "bill {} has an inventory-tracked line with no item",
                    header.id
                ))
            })?;
            apply_stock_move_wac(
                tx,
                ctx,
                StockMoveInput {
                    location_id: header.location_id,
                    item_id,
                    date: header.date,
                    move_type: StockMoveKind::PurchaseReceipt,
                    direction: Direction::In,
                    quantity: Rate::from_decimal(line.quantity),
                    unit_cost_applied: Rate::from_decimal(line.unit_amount),
                    total_cost_override: Some(line_total),
                    reference_type: "purchase_bill".to_string(),
                    reference_id: header.id.to_string(),
                    correlation_id: ctx.correlation_id,
                    journal_entry_id: None,
                    allow_backdated: false,
                    allow_negative_on_hand: false,
                },
            )
            .await?;
        }
        journal_lines.push(JournalLineInput::debit(line.account_id, line_total));
    }

    journal_lines.push(JournalLineInput::credit(ap_account_id, header.total_money()));

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &format!("Purchase bill {} posted", header.number),
            lines: journal_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    Ok(entry.id)
}

/// spec §4.4.3: `Dr GRNI receiptTotal`, `Dr Inventory landedCostTotal`,
/// `Dr/Cr PPV (inventoryBilledTotal − receiptTotal)`, `Cr AP billTotal`.
/// Landed cost is allocated across the receipt's lines weighted by each
/// line's share of `receiptTotal`, remainder on the last line, and
/// capitalized via value-only stock adjustments dated at the receipt date.
async fn post_with_linked_receipt(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    header: &DocumentHeader,
    ap_account_id: Uuid,
    receipt_id: Uuid,
) -> Result<Uuid, DocumentError> {
    let receipt = document_repo::find_by_id(tx, ctx.company_id.0, receipt_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("purchase receipt {receipt_id}")))?;
    assert_same_tenant(ctx, &receipt)?;

    let receipt_lines = document_line_repo::fetch_for_document(tx, receipt_id).await?;
    let receipt_total = receipt.total_money();

    let bill_lines = document_line_repo::fetch_for_document(tx, header.id).await?;
    let mut inventory_billed_total = Money::ZERO;
    let mut landed_cost_total = Money::ZERO;
    for line in &bill_lines {
        let line_total = Money::from_decimal(line.line_total);
        if line.is_inventory_tracked {
            inventory_billed_total += line_total;
        } else {
            landed_cost_total += line_total;
        }
    }

    let company = company_repo::find_by_id(tx, ctx.company_id.0)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("company {}", ctx.company_id.0)))?;

    let grni_account_id = match company.default_grni_account_id {
        Some(id) => id,
        None => {
            let account = account_repo::provision_if_missing(
                tx,
                ctx.company_id.0,
                "GRNI",
                "Goods Received Not Invoiced",
                AccountType::Liability,
            )
            .await?;
            company_repo::set_grni_account(tx, ctx.company_id.0, account.id).await?;
            account.id
        }
    };

    let ppv = inventory_billed_total - receipt_total;
    let ppv_account_id = if ppv.is_zero() {
        None
    } else {
        match company.default_ppv_account_id {
            Some(id) => Some(id),
            None => {
                let account = account_repo::provision_if_missing(
                    tx,
                    ctx.company_id.0,
                    "PPV",
                    "Purchase Price Variance",
                    AccountType::Expense,
                )
                .await?;
                company_repo::set_ppv_account(tx, ctx.company_id.0, account.id).await?;
                Some(account.id)
            }
        }
    };

    if landed_cost_total.is_positive() {
        allocate_landed_cost(tx, ctx, header, &receipt, &receipt_lines, landed_cost_total).await?;
    }

    let mut journal_lines = vec![JournalLineInput::debit(grni_account_id, receipt_total)];
    if landed_cost_total.is_positive() {
        journal_lines.push(JournalLineInput::debit(
            company.default_inventory_asset_account_id,
            landed_cost_total,
        ));
    }
    if ppv.is_positive() {
        journal_lines.push(JournalLineInput::debit(ppv_account_id.unwrap(), ppv));
    } else if ppv.is_negative() {
        journal_lines.push(JournalLineInput::credit(ppv_account_id.unwrap(), ppv.abs()));
    }
    journal_lines.push(JournalLineInput::credit(ap_account_id, header.total_money()));

    let entry = post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: header.date,
            description: &format!(
                "Purchase bill {} posted against receipt {}",
                header.number, receipt.number
            ),
            lines: journal_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    Ok(entry.id)
}

async fn allocate_landed_cost(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    header: &DocumentHeader,
    receipt: &DocumentHeader,
    receipt_lines: &[crate::types::DocumentLineRow],
    landed_cost_total: Money,
) -> Result<(), DocumentError> {
    let weight_base: Money = receipt_lines
        .iter()
        .map(|l| Money::from_decimal(l.line_total))
        .sum();

    if weight_base.is_zero() {
        return Err(DocumentError::ZeroWeightBase(header.id));
    }

    let mut allocations = Vec::with_capacity(receipt_lines.len());
    let mut allocated_so_far = Money::ZERO;

    for (idx, line) in receipt_lines.iter().enumerate() {
        let is_last = idx == receipt_lines.len() - 1;
        let line_total = Money::from_decimal(line.line_total);

        let amount = if is_last {
            landed_cost_total - allocated_so_far
        } else {
            let weight = Rate::from_decimal(line_total.as_decimal() / weight_base.as_decimal());
            landed_cost_total.mul_rate(weight)
        };
        allocated_so_far += amount;

        let item_id = line.item_id.ok_or_else(|| {
            DocumentError::InvalidInput(format!(
                "receipt {} has a line with no item for landed cost allocation",
                receipt.id
            ))
        })?;

        apply_stock_value_adjustment_wac(
            tx,
            ctx,
            receipt.location_id,
            item_id,
            receipt.date,
            amount,
            "purchase_bill_landed_cost".to_string(),
            header.id.to_string(),
            ctx.correlation_id,
            true,
        )
        .await?;

        allocations.push(landed_cost_repo::NewAllocation {
            company_id: ctx.company_id.0,
            purchase_bill_id: header.id,
            purchase_receipt_line_id: line.id,
            amount,
        });
    }

    landed_cost_repo::insert_all(tx, &allocations).await?;

    Ok(())
}

/// `purchaseBill.adjust` (spec §4.4.2). Mirrors `invoice_service::adjust`
/// against the AP account instead of AR; only valid for stand-alone bills
/// since linked-receipt bills adjust through the receipt relationship.
pub async fn adjust(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
    new_lines: Vec<DocumentLineInput>,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, bill_id).await?;
    check_transition(&header, DocumentEvent::Adjust)?;

    if header.linked_receipt_id.is_some() {
        return Err(DocumentError::InvalidStateTransition(
            "a linked-receipt purchase bill adjusts through the receipt, not directly".to_string(),
        ));
    }

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "bill {bill_id} has no posted journal entry to adjust"
        ))
    })?;
    let ap_account_id = header.clearing_account_id.ok_or_else(|| {
        DocumentError::InvalidInput(format!("bill {bill_id} has no AP account recorded"))
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
    *desired_net.entry(ap_account_id).or_insert(Money::ZERO) -= new_total;
    for line in &computed {
        *desired_net.entry(line.input.account_id).or_insert(Money::ZERO) += line.line_total;
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
            description: &format!("Purchase bill {} adjusted", header.number),
            lines: delta_lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    document_line_repo::replace_lines(tx, ctx.company_id.0, bill_id, &computed).await?;
    document_repo::set_total(tx, bill_id, new_total).await?;
    document_repo::set_last_adjustment(tx, bill_id, adjustment.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, bill_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {bill_id}")))
}

/// `purchaseBill.void` (spec §4.4.5, scenario 6): reverses adjustments and
/// the main entry, and posts a compensating OUT stock move per inventory
/// line at the originally applied cost.
pub async fn void(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
    reason: String,
) -> Result<DocumentHeader, DocumentError> {
    let header = lock(tx, ctx, bill_id).await?;
    check_transition(&header, DocumentEvent::Void)?;

    let journal_entry_id = header.journal_entry_id.ok_or_else(|| {
        DocumentError::InvalidStateTransition(format!(
            "bill {bill_id} has no posted journal entry to void"
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

    if header.linked_receipt_id.is_none() {
        let lines = document_line_repo::fetch_for_document(tx, bill_id).await?;
        for line in lines.iter().filter(|l| l.is_inventory_tracked) {
            let item_id = line.item_id.ok_or_else(|| {
                DocumentError::InvalidInput(format!(
                    "bill {bill_id} has an inventory-tracked line with no item"
                ))
            })?;
            apply_stock_move_wac(
                tx,
                ctx,
                StockMoveInput {
                    location_id: header.location_id,
                    item_id,
                    date: header.date,
                    move_type: StockMoveKind::Adjustment,
                    direction: Direction::Out,
                    quantity: Rate::from_decimal(line.quantity),
                    unit_cost_applied: Rate::ZERO,
                    total_cost_override: Some(Money::from_decimal(line.line_total)),
                    reference_type: "purchase_bill_void".to_string(),
                    reference_id: bill_id.to_string(),
                    correlation_id: ctx.correlation_id,
                    journal_entry_id: Some(reversal.reversal.id),
                    allow_backdated: false,
                    allow_negative_on_hand: true,
                },
            )
            .await?;
        }
    }

    document_repo::mark_void(tx, bill_id, reversal.reversal.id).await?;

    document_repo::find_by_id(tx, ctx.company_id.0, bill_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {bill_id}")))
}

pub async fn delete(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
) -> Result<(), DocumentError> {
    let header = lock(tx, ctx, bill_id).await?;
    check_transition(&header, DocumentEvent::Delete)?;
    document_repo::delete(tx, bill_id).await?;
    Ok(())
}

/// `purchaseBill.applyPayment`.
pub async fn apply_payment(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
    bank_account_id: Uuid,
    ap_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::record_payment(
        tx,
        ctx,
        bill_id,
        bank_account_id,
        crate::services::settlement_service::PaymentDirection::VendorPayment { ap_account_id },
        date,
        amount,
    )
    .await
}

/// `purchaseBill.applyVendorCredit`.
pub async fn apply_vendor_credit(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
    credit_note_id: Uuid,
    ap_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::apply_credit(
        tx,
        ctx,
        bill_id,
        credit_note_id,
        ap_account_id,
        date,
        amount,
    )
    .await
}

/// `purchaseBill.applyVendorAdvance`.
pub async fn apply_vendor_advance(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
    advance_id: Uuid,
    ap_account_id: Uuid,
    date: NaiveDate,
    amount: Money,
) -> Result<crate::services::settlement_service::SettlementOutcome, DocumentError> {
    crate::services::settlement_service::apply_advance(
        tx,
        ctx,
        bill_id,
        advance_id,
        ap_account_id,
        date,
        amount,
    )
    .await
}

async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    bill_id: Uuid,
) -> Result<DocumentHeader, DocumentError> {
    let header = document_repo::lock_by_id(tx, ctx.company_id.0, bill_id)
        .await?
        .ok_or_else(|| DocumentError::NotFound(format!("document {bill_id}")))?;
    assert_same_tenant(ctx, &header)?;
    if header.kind != DocumentKind::PurchaseBill {
        return Err(DocumentError::InvalidInput(format!(
            "document {bill_id} is not a purchase bill"
        )));
    }
    Ok(header)
}

fn compute_lines(inputs: Vec<DocumentLineInput>) -> Result<Vec<ComputedLine>, DocumentError> {
    if inputs.is_empty() {
        return Err(DocumentError::InvalidInput(
            "a purchase bill needs at least one line".to_string(),
        ));
    }
    inputs.into_iter().map(compute_line).collect()
}
