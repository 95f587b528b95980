//! Reversal and net-delta adjustment.
//!
//! Both operations build a new, independently-balanced entry rather than
//! mutating history: a reversal swaps debit/credit on every line of the
//! original; an adjustment posts just the delta between an entry's old and
//! new net position per account.

use crate::errors::LedgerError;
use crate::repos::journal_repo;
use crate::services::journal_service::{self, PostJournalEntryInput};
use crate::types::{JournalEntry, JournalLineInput};
use chrono::NaiveDate;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use tenant_context::{assert_same_tenant, TenantContext};
use uuid::Uuid;

pub struct CreateReversalInput {
    pub original_id: Uuid,
    pub reversal_date: NaiveDate,
    pub reason: String,
    /// Set when this reversal is the full-void path for a document, which
    /// also annotates `voided_at`/`void_reason` on the original entry.
    pub is_void: bool,
}

pub struct ReversalOutcome {
    pub original_id: Uuid,
    pub reversal: JournalEntry,
}

/// Create the inverse of `original_id`: every line's debit/credit swapped,
/// linked via `reversal_of_journal_entry_id`. Rejects reversing an entry
/// that already has a reversal on file.
pub async fn create_reversal(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: CreateReversalInput,
) -> Result<ReversalOutcome, LedgerError> {
    let (original, original_lines) =
        journal_repo::fetch_entry_with_lines(tx, ctx.company_id.0, input.original_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("journal entry {}", input.original_id)))?;

    assert_same_tenant(ctx, &original)?;

    if journal_repo::has_existing_reversal(tx, ctx.company_id.0, input.original_id).await? {
        return Err(LedgerError::AlreadyReversed(input.original_id));
    }

    let reversal_lines: Vec<JournalLineInput> = original_lines
        .iter()
        .map(|line| JournalLineInput {
            account_id: line.account_id,
            debit: line.credit,
            credit: line.debit,
        })
        .collect();

    let description = format!("Reversal of {}: {}", input.original_id, input.reason);

    let reversal = journal_service::post_journal_entry(
        tx,
        ctx,
        PostJournalEntryInput {
            date: input.reversal_date,
            description: &description,
            lines: reversal_lines,
            reversal_of_journal_entry_id: Some(input.original_id),
            skip_account_validation: true,
        },
    )
    .await?;

    if input.is_void {
        journal_repo::mark_voided(tx, ctx.company_id.0, input.original_id, &input.reason).await?;
    }

    Ok(ReversalOutcome {
        original_id: input.original_id,
        reversal,
    })
}

/// Compute balanced adjustment lines taking an entry's existing net
/// position per account to `desired_net`. Accounts present in neither map
/// produce no line; the returned lines always sum to a balanced entry
/// because they are built from signed deltas (net debit − net credit).
pub fn compute_net_delta_lines(
    existing_lines: &[crate::types::JournalLine],
    desired_net: &std::collections::HashMap<Uuid, Money>,
) -> Vec<JournalLineInput> {
    let existing_net = journal_repo::net_by_account(existing_lines);

    let mut accounts: Vec<Uuid> = existing_net.keys().chain(desired_net.keys()).copied().collect();
    accounts.sort_unstable();
    accounts.dedup();

    let mut lines = Vec::new();
    for account_id in accounts {
        let before = existing_net.get(&account_id).copied().unwrap_or(Money::ZERO);
        let after = desired_net.get(&account_id).copied().unwrap_or(Money::ZERO);
        let delta = after - before;

        if delta.is_positive() {
            lines.push(JournalLineInput::debit(account_id, delta));
        } else if delta.is_negative() {
            lines.push(JournalLineInput::credit(account_id, delta.abs()));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn net_delta_is_empty_when_nothing_changed() {
        let account = Uuid::new_v4();
        let mut desired = HashMap::new();
        desired.insert(account, Money::parse("100.00").unwrap());

        let existing_lines = vec![crate::types::JournalLine {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            journal_entry_id: Uuid::new_v4(),
            account_id: account,
            debit: Money::parse("100.00").unwrap(),
            credit: Money::ZERO,
        }];

        let lines = compute_net_delta_lines(&existing_lines, &desired);
        assert!(lines.is_empty());
    }

    #[test]
    fn net_delta_produces_a_balanced_entry_for_a_single_account_change() {
        let ar = Uuid::new_v4();
        let income = Uuid::new_v4();

        let existing_lines = vec![
            crate::types::JournalLine {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                journal_entry_id: Uuid::new_v4(),
                account_id: ar,
                debit: Money::parse("200.00").unwrap(),
                credit: Money::ZERO,
            },
            crate::types::JournalLine {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                journal_entry_id: Uuid::new_v4(),
                account_id: income,
                debit: Money::ZERO,
                credit: Money::parse("200.00").unwrap(),
            },
        ];

        let mut desired = HashMap::new();
        desired.insert(ar, Money::parse("250.00").unwrap());
        desired.insert(income, Money::parse("-250.00").unwrap());

        let lines = compute_net_delta_lines(&existing_lines, &desired);
        let total_debit: Money = lines.iter().map(|l| l.debit).sum();
        let total_credit: Money = lines.iter().map(|l| l.credit).sum();
        assert_eq!(total_debit, total_credit);
        assert_eq!(total_debit, Money::parse("50.00").unwrap());
    }
}
