//! Period-close guard and the close operation itself.
//!
//! Closing a period is the only place the posting core aggregates
//! `journal_lines` directly — every other balance question is answered by
//! the out-of-scope projection worker. It is done here, once, at close
//! time, because the closing entry itself must be computed from exactly
//! the committed lines in range.

use crate::errors::LedgerError;
use crate::repos::period_repo;
use crate::types::{AccountType, JournalEntry, JournalLineInput};
use chrono::NaiveDate;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use tenant_context::TenantContext;
use uuid::Uuid;

/// The kind of operation being checked against the close boundary. All
/// actions obey the same `transactionDate > closedThrough` rule; this is
/// carried through mainly so the rejection message and telemetry are
/// specific about what was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAction {
    Post,
    Reverse,
    Adjust,
    Close,
}

/// Reject any posting whose effective date falls on or before the close
/// boundary. A company with no prior close has nothing to enforce.
pub async fn assert_open_period(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    transaction_date: NaiveDate,
    _action: PeriodAction,
) -> Result<(), LedgerError> {
    let Some(close) = period_repo::latest_close(tx, company_id).await? else {
        return Ok(());
    };

    if transaction_date <= close.to_date {
        return Err(LedgerError::PeriodClosed {
            transaction_date,
            closed_through: close.to_date,
        });
    }

    Ok(())
}

/// Close `[from, to]`: computes net income/expense across the window,
/// posts a closing entry transferring those nets to `equity_account_id`,
/// and records the close. Refuses to re-close an overlapping window.
pub async fn close_period(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    from: NaiveDate,
    to: NaiveDate,
    equity_account_id: Uuid,
) -> Result<JournalEntry, LedgerError> {
    if period_repo::overlaps_existing_close(tx, ctx.company_id.0, from, to).await? {
        return Err(LedgerError::PeriodAlreadyClosed { from, to });
    }

    let nets = period_repo::income_and_expense_nets(tx, ctx.company_id.0, from, to).await?;

    let mut lines = Vec::new();
    let mut net_income = Money::ZERO;

    for net in nets {
        let net_debit_minus_credit = Money::from_decimal(net.net_debit_minus_credit);
        if net_debit_minus_credit.is_zero() {
            continue;
        }

        match net.account_type {
            AccountType::Income => {
                // Income's normal balance is credit; a positive credit-side
                // net (negative debit-minus-credit) is income earned and is
                // zeroed by debiting the account for that amount.
                let income_net = -net_debit_minus_credit;
                if income_net.is_positive() {
                    lines.push(JournalLineInput::debit(net.account_id, income_net));
                    net_income += income_net;
                } else if income_net.is_negative() {
                    lines.push(JournalLineInput::credit(net.account_id, income_net.abs()));
                    net_income += income_net;
                }
            }
            AccountType::Expense => {
                // Expense's normal balance is debit; zero it by crediting
                // the account for its net debit balance.
                if net_debit_minus_credit.is_positive() {
                    lines.push(JournalLineInput::credit(
                        net.account_id,
                        net_debit_minus_credit,
                    ));
                    net_income -= net_debit_minus_credit;
                } else if net_debit_minus_credit.is_negative() {
                    lines.push(JournalLineInput::debit(
                        net.account_id,
                        net_debit_minus_credit.abs(),
                    ));
                    net_income -= net_debit_minus_credit;
                }
            }
            _ => unreachable!("income_and_expense_nets only returns INCOME/EXPENSE accounts"),
        }
    }

    if net_income.is_positive() {
        lines.push(JournalLineInput::credit(equity_account_id, net_income));
    } else if net_income.is_negative() {
        lines.push(JournalLineInput::debit(equity_account_id, net_income.abs()));
    }

    if lines.len() < 2 {
        return Err(LedgerError::InvalidInput(
            "period has no income/expense activity to close".to_string(),
        ));
    }

    let entry = crate::services::journal_service::post_journal_entry(
        tx,
        ctx,
        crate::services::journal_service::PostJournalEntryInput {
            date: to,
            description: &format!("Period close {from}..{to}"),
            lines,
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await?;

    period_repo::insert_close(tx, ctx.company_id.0, from, to, entry.id).await?;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_action_variants_are_distinct() {
        assert_ne!(PeriodAction::Post, PeriodAction::Reverse);
        assert_ne!(PeriodAction::Adjust, PeriodAction::Close);
    }
}
