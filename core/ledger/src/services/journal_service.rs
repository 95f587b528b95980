//! Journal entry posting.
//!
//! `post_journal_entry` is the single write path every document-posting
//! flow (invoice, purchase bill, payment, ...) funnels through. It enforces
//! the invariants that make the ledger trustworthy: balance, valid lines,
//! same-tenant accounts, and an open accounting period.

use crate::errors::LedgerError;
use crate::repos::{account_repo, journal_repo, outbox_repo};
use crate::services::period_close_service::{self, PeriodAction};
use crate::types::{JournalEntry, JournalLineInput};
use chrono::{NaiveDate, Utc};
use event_bus::EventEnvelope;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use tenant_context::TenantContext;
use uuid::Uuid;

pub struct PostJournalEntryInput<'a> {
    pub date: NaiveDate,
    pub description: &'a str,
    pub lines: Vec<JournalLineInput>,
    pub reversal_of_journal_entry_id: Option<Uuid>,
    pub skip_account_validation: bool,
}

/// Validate and write a `JournalEntry` + its `JournalLine`s. Does not
/// commit `tx` — the caller controls the transaction boundary so this can
/// compose with stock moves and settlement rows in one atomic write.
pub async fn post_journal_entry(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &TenantContext,
    input: PostJournalEntryInput<'_>,
) -> Result<JournalEntry, LedgerError> {
    validate_lines(&input.lines)?;

    if !input.skip_account_validation {
        for line in &input.lines {
            let account = account_repo::find_by_id(tx, ctx.company_id.0, line.account_id)
                .await?
                .ok_or(LedgerError::AccountNotInCompany(line.account_id))?;
            if !account.is_active {
                return Err(LedgerError::InvalidLine(format!(
                    "account {} is not active",
                    line.account_id
                )));
            }
        }
    }

    let action = if input.reversal_of_journal_entry_id.is_some() {
        PeriodAction::Reverse
    } else {
        PeriodAction::Post
    };
    period_close_service::assert_open_period(tx, ctx.company_id.0, input.date, action).await?;

    let entry_id = Uuid::new_v4();

    journal_repo::insert_entry(
        tx,
        journal_repo::NewEntry {
            id: entry_id,
            company_id: ctx.company_id.0,
            date: input.date,
            description: input.description,
            reversal_of_journal_entry_id: input.reversal_of_journal_entry_id,
        },
    )
    .await?;

    let new_lines: Vec<journal_repo::NewLine> = input
        .lines
        .iter()
        .map(|line| journal_repo::NewLine {
            id: Uuid::new_v4(),
            company_id: ctx.company_id.0,
            journal_entry_id: entry_id,
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
        })
        .collect();

    journal_repo::bulk_insert_lines(tx, &new_lines).await?;

    let event_type = if input.reversal_of_journal_entry_id.is_some() {
        "journal.entry.reversed"
    } else {
        "journal.entry.created"
    };

    let payload = serde_json::json!({
        "journalEntryId": entry_id,
        "date": input.date,
        "reversalOfJournalEntryId": input.reversal_of_journal_entry_id,
    });

    let envelope = EventEnvelope::new(
        ctx.company_id.0,
        event_type,
        "journal_entry",
        entry_id.to_string(),
        "gl-rs",
        ctx.correlation_id,
        None,
        payload,
    );
    let outbox_event = event_bus::OutboxEvent::from_envelope(&envelope)?;
    outbox_repo::insert(tx, ctx.company_id.0, &outbox_event).await?;

    Ok(JournalEntry {
        id: entry_id,
        company_id: ctx.company_id.0,
        date: input.date,
        description: input.description.to_string(),
        reversal_of_journal_entry_id: input.reversal_of_journal_entry_id,
        voided_at: None,
        void_reason: None,
        created_at: Utc::now(),
    })
}

fn validate_lines(lines: &[JournalLineInput]) -> Result<(), LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InvalidLine(format!(
            "a journal entry needs at least 2 lines, got {}",
            lines.len()
        )));
    }

    let mut total_debit = Money::ZERO;
    let mut total_credit = Money::ZERO;

    for (idx, line) in lines.iter().enumerate() {
        if line.debit.is_negative() || line.credit.is_negative() {
            return Err(LedgerError::InvalidLine(format!(
                "line {idx}: debit and credit must be non-negative"
            )));
        }
        let debit_positive = line.debit.is_positive();
        let credit_positive = line.credit.is_positive();
        if debit_positive == credit_positive {
            return Err(LedgerError::InvalidLine(format!(
                "line {idx}: exactly one of debit/credit must be positive"
            )));
        }
        total_debit += line.debit;
        total_credit += line.credit;
    }

    if total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntry {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fewer_than_two_lines() {
        let lines = vec![JournalLineInput::debit(Uuid::new_v4(), Money::parse("1.00").unwrap())];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine(_))
        ));
    }

    #[test]
    fn rejects_a_line_with_both_debit_and_credit_set() {
        let account = Uuid::new_v4();
        let lines = vec![
            JournalLineInput {
                account_id: account,
                debit: Money::parse("1.00").unwrap(),
                credit: Money::parse("1.00").unwrap(),
            },
            JournalLineInput::credit(Uuid::new_v4(), Money::parse("1.00").unwrap()),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine(_))
        ));
    }

    #[test]
    fn rejects_unbalanced_totals() {
        let lines = vec![
            JournalLineInput::debit(Uuid::new_v4(), Money::parse("100.00").unwrap()),
            JournalLineInput::credit(Uuid::new_v4(), Money::parse("99.00").unwrap()),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn accepts_a_balanced_two_line_entry() {
        let lines = vec![
            JournalLineInput::debit(Uuid::new_v4(), Money::parse("220.00").unwrap()),
            JournalLineInput::credit(Uuid::new_v4(), Money::parse("220.00").unwrap()),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn accepts_a_balanced_three_line_entry_matching_scenario_one() {
        // Dr AR 220, Cr Sales Income 200, Cr Tax Payable 20
        let lines = vec![
            JournalLineInput::debit(Uuid::new_v4(), Money::parse("220.00").unwrap()),
            JournalLineInput::credit(Uuid::new_v4(), Money::parse("200.00").unwrap()),
            JournalLineInput::credit(Uuid::new_v4(), Money::parse("20.00").unwrap()),
        ];
        assert!(validate_lines(&lines).is_ok());
    }
}
